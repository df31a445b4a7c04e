pub mod system_settings;
pub mod toml_config;

pub use system_settings::SystemSettings;
pub use toml_config::AppConfig;

#[cfg(feature = "cli")]
pub use cli::{
    AdminCommand, AuthCommand, BookingsCommand, CarsCommand, CartCommand, CheckoutArgs, CliConfig,
    Command, NotificationsCommand, OptionFlags, SettingsCommand,
};

#[cfg(feature = "cli")]
mod cli {
    use crate::core::cart::RentalPlan;
    use crate::domain::model::{BookingStatus, CarCategory, CarStatus, PaymentMethod};
    use crate::utils::error::{RentalError, Result};
    use crate::utils::validation::{validate_path, validate_url, Validate};
    use chrono::NaiveDate;
    use clap::{Args, Parser, Subcommand};
    use std::path::PathBuf;

    #[derive(Debug, Parser)]
    #[command(name = "autopro")]
    #[command(about = "Car rental storefront and back office client")]
    pub struct CliConfig {
        /// Path to a TOML configuration file
        #[arg(short, long, global = true)]
        pub config: Option<PathBuf>,

        /// Override the API base URL from the config
        #[arg(long, global = true)]
        pub base_url: Option<String>,

        /// Override the session storage directory
        #[arg(long, global = true)]
        pub storage: Option<String>,

        /// Enable verbose output
        #[arg(short, long, global = true)]
        pub verbose: bool,

        /// Emit JSON log lines instead of human-readable output
        #[arg(long, global = true)]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Subcommand)]
    pub enum Command {
        /// Browse and manage the fleet
        #[command(subcommand)]
        Cars(CarsCommand),
        /// Browse and manage bookings
        #[command(subcommand)]
        Bookings(BookingsCommand),
        /// Sign in, sign up and inspect the session
        #[command(subcommand)]
        Auth(AuthCommand),
        /// Edit the persisted cart
        #[command(subcommand)]
        Cart(CartCommand),
        /// Place an order for everything in the cart
        Checkout(CheckoutArgs),
        /// Real-time notifications
        #[command(subcommand)]
        Notifications(NotificationsCommand),
        /// Back-office reports
        #[command(subcommand)]
        Admin(AdminCommand),
        /// Back-office settings document
        #[command(subcommand)]
        Settings(SettingsCommand),
    }

    #[derive(Debug, Subcommand)]
    pub enum CarsCommand {
        List {
            #[arg(long)]
            search: Option<String>,
            #[arg(long)]
            category: Option<CarCategory>,
            #[arg(long)]
            status: Option<CarStatus>,
        },
        Get {
            id: String,
        },
        /// Create a car from a JSON document
        Create {
            #[arg(long)]
            file: PathBuf,
        },
        Update {
            id: String,
            #[arg(long)]
            file: PathBuf,
        },
        Delete {
            id: String,
        },
    }

    #[derive(Debug, Subcommand)]
    pub enum BookingsCommand {
        List {
            #[arg(long)]
            status: Option<BookingStatus>,
            #[arg(long)]
            car_id: Option<String>,
        },
        Get {
            id: String,
        },
        /// Create a booking from a JSON document
        Create {
            #[arg(long)]
            file: PathBuf,
        },
        /// Apply a partial update from a JSON document
        Update {
            id: String,
            #[arg(long)]
            file: PathBuf,
        },
        Delete {
            id: String,
        },
        Confirm {
            id: String,
        },
        Cancel {
            id: String,
            #[arg(long)]
            reason: Option<String>,
        },
    }

    #[derive(Debug, Subcommand)]
    pub enum AuthCommand {
        Login {
            #[arg(long)]
            email: String,
            #[arg(long, env = "AUTOPRO_PASSWORD")]
            password: String,
        },
        Register {
            #[arg(long)]
            name: String,
            #[arg(long)]
            email: String,
            #[arg(long, env = "AUTOPRO_PASSWORD")]
            password: String,
            #[arg(long)]
            phone: Option<String>,
        },
        Logout,
        Whoami,
    }

    #[derive(Debug, Clone, Default, Args)]
    pub struct OptionFlags {
        #[arg(long)]
        pub full_insurance: bool,
        #[arg(long)]
        pub child_seat: bool,
        #[arg(long)]
        pub gps: bool,
        #[arg(long)]
        pub additional_driver: bool,
    }

    impl OptionFlags {
        pub fn any(&self) -> bool {
            self.full_insurance || self.child_seat || self.gps || self.additional_driver
        }
    }

    #[derive(Debug, Subcommand)]
    pub enum CartCommand {
        Show,
        /// Add a car from the catalog; dates take precedence over --days
        Add {
            car_id: String,
            #[arg(long, default_value = "1")]
            days: u32,
            #[arg(long)]
            start: Option<NaiveDate>,
            #[arg(long)]
            end: Option<NaiveDate>,
            #[arg(long, default_value = "daily")]
            plan: RentalPlan,
            #[command(flatten)]
            options: OptionFlags,
        },
        Update {
            car_id: String,
            #[arg(long)]
            days: Option<u32>,
            #[arg(long)]
            start: Option<NaiveDate>,
            #[arg(long)]
            end: Option<NaiveDate>,
            #[command(flatten)]
            options: OptionFlags,
        },
        Remove {
            car_id: String,
        },
        Clear,
    }

    #[derive(Debug, Args)]
    pub struct CheckoutArgs {
        #[arg(long)]
        pub first_name: String,
        #[arg(long)]
        pub last_name: String,
        #[arg(long)]
        pub email: String,
        #[arg(long)]
        pub phone: String,
        #[arg(long)]
        pub address: String,
        #[arg(long)]
        pub city: String,
        #[arg(long)]
        pub zip: Option<String>,
        #[arg(long, default_value = "card")]
        pub payment_method: PaymentMethod,
    }

    #[derive(Debug, Subcommand)]
    pub enum NotificationsCommand {
        /// Stay connected and print notifications until interrupted
        Listen {
            /// Override the notifications URL from the config
            #[arg(long)]
            url: Option<String>,
        },
    }

    #[derive(Debug, Subcommand)]
    pub enum AdminCommand {
        Dashboard {
            /// Month to report revenue for, as YYYY-MM-DD (any day of it)
            #[arg(long)]
            month: Option<NaiveDate>,
            #[arg(long, default_value = "5")]
            recent: usize,
        },
        Bookings {
            #[arg(long)]
            search: Option<String>,
            #[arg(long)]
            status: Option<BookingStatus>,
            #[arg(long)]
            date: Option<NaiveDate>,
            /// Set this status on every matching booking
            #[arg(long)]
            set_status: Option<BookingStatus>,
        },
        /// Write bookings as a CSV sheet
        Export {
            #[arg(long)]
            output: PathBuf,
            #[arg(long)]
            status: Option<BookingStatus>,
        },
    }

    #[derive(Debug, Subcommand)]
    pub enum SettingsCommand {
        Show {
            #[arg(long)]
            file: Option<PathBuf>,
        },
        Validate {
            #[arg(long)]
            file: PathBuf,
        },
        /// Write the default settings document
        Init {
            #[arg(long)]
            file: PathBuf,
        },
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if let Some(url) = &self.base_url {
                validate_url("base_url", url)?;
            }
            if let Some(path) = &self.storage {
                validate_path("storage", path)?;
            }
            if let Command::Cart(CartCommand::Add { days: 0, start: None, .. }) = &self.command {
                return Err(RentalError::validation("--days must be at least 1"));
            }
            Ok(())
        }
    }

}
