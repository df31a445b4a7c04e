use autopro::app::admin::{
    export_bookings_csv, recent_bookings, BookingAdmin, BookingFilter, CarAdmin, CarFilter, DashboardStats,
};
use autopro::config::{
    AdminCommand, AuthCommand, BookingsCommand, CarsCommand, CartCommand, CheckoutArgs, Command,
    NotificationsCommand, OptionFlags, SettingsCommand,
};
use autopro::core::bookings::BookingQuery;
use autopro::core::cars::CarQuery;
use autopro::core::cart::rental_days_between;
use autopro::core::checkout::{self, CheckoutForm};
use autopro::domain::model::{
    BookingUpdate, CarInput, CartItem, CartItemPatch, Credentials, NewBooking, Registration, RentalOptions,
};
use autopro::utils::error::ErrorSeverity;
use autopro::utils::{logger, validation::Validate};
use autopro::{
    ApiClient, AppConfig, Cart, CliConfig, LocalStorage, NotificationCenter, NotificationClient, RentalError,
    Result, SystemSettings, TracingToastSink, WsConnector,
};
use clap::Parser;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI arguments: {:?}", cli);

    if let Err(e) = cli.validate() {
        fail(&e, "Invalid arguments");
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(&e, "Configuration validation failed"),
    };

    let store = Arc::new(LocalStorage::new(config.storage_path()));
    let client = match ApiClient::with_timeout(config.base_url(), store, config.timeout()) {
        Ok(client) => client,
        Err(e) => fail(&e, "Failed to build HTTP client"),
    };
    tracing::debug!("🔍 API: {}, storage: {}", client.base_url(), config.storage_path());

    if let Err(e) = run(cli.command, &config, &client).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        if let RentalError::Unauthorized { redirect, from } = &e {
            tracing::info!("Redirect to {} (return to {})", redirect, from.as_deref().unwrap_or("/"));
        }
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = exit_code(e.severity());
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &RentalError, context: &str) -> ! {
    tracing::error!("❌ {}: {}", context, e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}

fn load_config(cli: &CliConfig) -> Result<AppConfig> {
    if let Some(path) = &cli.config {
        tracing::info!("📁 Loading configuration from: {}", path.display());
    }
    let mut config = AppConfig::load(cli.config.as_deref())?;

    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
        tracing::info!("🔧 API base URL overridden to: {}", base_url);
    }
    if let Some(storage) = &cli.storage {
        config.storage.path = storage.clone();
    }

    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn options_from(flags: &OptionFlags) -> Option<RentalOptions> {
    flags.any().then(|| RentalOptions {
        full_insurance: flags.full_insurance,
        child_seat: flags.child_seat,
        gps: flags.gps,
        additional_driver: flags.additional_driver,
    })
}

async fn run(command: Command, config: &AppConfig, client: &ApiClient) -> Result<()> {
    match command {
        Command::Cars(cmd) => run_cars(cmd, client).await,
        Command::Bookings(cmd) => run_bookings(cmd, client).await,
        Command::Auth(cmd) => run_auth(cmd, client).await,
        Command::Cart(cmd) => run_cart(cmd, config, client).await,
        Command::Checkout(args) => run_checkout(args, config, client).await,
        Command::Notifications(cmd) => run_notifications(cmd, config).await,
        Command::Admin(cmd) => run_admin(cmd, client).await,
        Command::Settings(cmd) => run_settings(cmd),
    }
}

async fn run_cars(command: CarsCommand, client: &ApiClient) -> Result<()> {
    match command {
        CarsCommand::List {
            search,
            category,
            status,
        } => {
            let query = CarQuery {
                search,
                category,
                status,
                ..Default::default()
            };
            let cars = client.cars().get_all(Some(&query)).await?;
            for car in &cars {
                println!(
                    "{:<8} {:<28} {:<10} {:>10.0} / {:<6} {}",
                    car.id,
                    car.title,
                    car.category.label(),
                    car.price,
                    car.price_unit,
                    car.status.label()
                );
            }
            tracing::info!("📊 {} car(s)", cars.len());
            Ok(())
        }
        CarsCommand::Get { id } => print_json(&client.cars().get_by_id(&id).await?),
        CarsCommand::Create { file } => {
            let input: CarInput = read_json(&file)?;
            print_json(&CarAdmin::new(client)?.create(&input).await?)
        }
        CarsCommand::Update { id, file } => {
            let input: CarInput = read_json(&file)?;
            print_json(&CarAdmin::new(client)?.update(&id, &input).await?)
        }
        CarsCommand::Delete { id } => CarAdmin::new(client)?.delete(&id).await,
    }
}

async fn run_bookings(command: BookingsCommand, client: &ApiClient) -> Result<()> {
    let bookings = client.bookings();
    match command {
        BookingsCommand::List { status, car_id } => {
            let query = BookingQuery {
                status,
                car_id,
                ..Default::default()
            };
            print_json(&bookings.get_all(Some(&query)).await?)
        }
        BookingsCommand::Get { id } => print_json(&bookings.get_by_id(&id).await?),
        BookingsCommand::Create { file } => {
            let request: NewBooking = read_json(&file)?;
            print_json(&bookings.create(&request).await?)
        }
        BookingsCommand::Update { id, file } => {
            let update: BookingUpdate = read_json(&file)?;
            print_json(&bookings.update(&id, &update).await?)
        }
        BookingsCommand::Delete { id } => {
            bookings.delete(&id).await?;
            println!("✅ Booking {} deleted", id);
            Ok(())
        }
        BookingsCommand::Confirm { id } => {
            BookingAdmin::new(client)?.confirm(&id).await?;
            println!("✅ Booking {} confirmed", id);
            Ok(())
        }
        BookingsCommand::Cancel { id, reason } => {
            BookingAdmin::new(client)?
                .cancel(&id, reason.as_deref().unwrap_or_default())
                .await?;
            println!("✅ Booking {} cancelled", id);
            Ok(())
        }
    }
}

async fn run_auth(command: AuthCommand, client: &ApiClient) -> Result<()> {
    let auth = client.auth();
    match command {
        AuthCommand::Login { email, password } => {
            let response = auth.login(&Credentials { email, password }).await?;
            match response.user {
                Some(user) => println!("✅ Signed in as {} ({})", user.name, user.role.as_str()),
                None => println!("⚠️ Server accepted the credentials but issued no session"),
            }
            Ok(())
        }
        AuthCommand::Register {
            name,
            email,
            password,
            phone,
        } => {
            let registration = Registration {
                name,
                email,
                password,
                phone,
            };
            print_json(&auth.register(&registration).await?)
        }
        AuthCommand::Logout => {
            auth.logout();
            println!("👋 Signed out");
            Ok(())
        }
        AuthCommand::Whoami => {
            match auth.current_user()? {
                Some(user) if auth.is_authenticated() => {
                    println!("{} <{}> role: {}", user.name, user.email, user.role.as_str())
                }
                _ if auth.is_authenticated() => println!("Signed in, no profile stored"),
                _ => println!("Not signed in"),
            }
            Ok(())
        }
    }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("🛒 Cart is empty");
        return;
    }
    for item in cart.items() {
        let dates = match (item.start_date, item.end_date) {
            (Some(start), Some(end)) => format!(" {} → {}", start, end),
            _ => String::new(),
        };
        println!(
            "{:<8} {:<28} {:>3} day(s){} options {:>8.2} line {:>10.2}",
            item.id,
            item.title,
            item.rental_days,
            dates,
            cart.options_price(item),
            cart.line_total(item)
        );
    }
    println!("Total: {:.2} for {} car(s)", cart.total_price(), cart.item_count());
}

async fn run_cart(command: CartCommand, config: &AppConfig, client: &ApiClient) -> Result<()> {
    let mut cart = Cart::load(client.store().clone(), config.pricing);
    match command {
        CartCommand::Show => {}
        CartCommand::Add {
            car_id,
            days,
            start,
            end,
            plan,
            options,
        } => {
            let car = client.cars().get_by_id(&car_id).await?;
            let rental_days = match (start, end) {
                (Some(start), Some(end)) => rental_days_between(start, end)?,
                _ => days,
            };
            let mut item = CartItem::from_car(&car, rental_days);
            item.price = plan.effective_daily_price(&car);
            item.start_date = start;
            item.end_date = end;
            item.options = options_from(&options);
            cart.add_item(item)?;
            println!("✅ {} added to cart", car.title);
        }
        CartCommand::Update {
            car_id,
            days,
            start,
            end,
            options,
        } => {
            let rental_days = match (start, end) {
                (Some(start), Some(end)) => Some(rental_days_between(start, end)?),
                _ => days,
            };
            let patch = CartItemPatch {
                rental_days,
                start_date: start,
                end_date: end,
                options: options_from(&options),
                ..Default::default()
            };
            if !cart.update_item(&car_id, patch)? {
                return Err(RentalError::NotFound {
                    kind: "Cart item".to_string(),
                    id: car_id,
                });
            }
        }
        CartCommand::Remove { car_id } => {
            if !cart.remove_item(&car_id)? {
                return Err(RentalError::NotFound {
                    kind: "Cart item".to_string(),
                    id: car_id,
                });
            }
        }
        CartCommand::Clear => cart.clear()?,
    }
    print_cart(&cart);
    Ok(())
}

async fn run_checkout(args: CheckoutArgs, config: &AppConfig, client: &ApiClient) -> Result<()> {
    let mut cart = Cart::load(client.store().clone(), config.pricing);
    let form = CheckoutForm {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone: args.phone,
        address: args.address,
        city: args.city,
        zip: args.zip,
        payment_method: args.payment_method,
    };

    let receipt = checkout::submit(&mut cart, &client.bookings(), &form).await?;
    println!("✅ Order placed: {} booking(s), total {:.2}", receipt.bookings.len(), receipt.total_price);
    for booking in &receipt.bookings {
        println!("   #{} {} {} → {}", booking.id, booking.car_name, booking.start_date, booking.end_date);
    }
    Ok(())
}

async fn run_notifications(command: NotificationsCommand, config: &AppConfig) -> Result<()> {
    let NotificationsCommand::Listen { url } = command;
    let url = url.unwrap_or_else(|| config.notifications_url().to_string());

    let inbox = Arc::new(Mutex::new(NotificationCenter::new()));
    let sink = inbox.clone();
    let client = NotificationClient::new(
        url.clone(),
        config.reconnect_policy(),
        Arc::new(WsConnector),
        Arc::new(TracingToastSink),
    )
    .show_toasts(config.notifications.show_toasts)
    .on_open(|| tracing::info!("✅ Notification channel open"))
    .on_close(|| tracing::info!("Notification channel closed"))
    .on_message(move |message| {
        if let Ok(mut center) = sink.lock() {
            center.push(message.clone());
            if let Some(entry) = center.entries().first() {
                println!("🔔 {}: {} ({} unread)", entry.title(), entry.body(), center.unread_count());
            }
        }
    });

    let handle = client.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, disconnecting");
            handle.disconnect();
        }
    });

    tracing::info!("🔍 Listening for notifications on {}", url);
    let outcome = client.run().await?;
    let received = inbox.lock().map(|c| c.entries().len()).unwrap_or_default();
    tracing::info!("Listener stopped ({:?}), {} notification(s) received", outcome, received);
    Ok(())
}

async fn run_admin(command: AdminCommand, client: &ApiClient) -> Result<()> {
    let bookings_admin = BookingAdmin::new(client)?;
    match command {
        AdminCommand::Dashboard { month, recent } => {
            let cars = CarAdmin::new(client)?.list(None, &CarFilter::default()).await?;
            let bookings = bookings_admin.list(None, &BookingFilter::default()).await?;
            let month = month.unwrap_or_else(|| chrono::Local::now().date_naive());

            let stats = DashboardStats::compute(&cars, &bookings, month);
            print_json(&stats)?;
            println!("Recent bookings:");
            for booking in recent_bookings(&bookings, recent) {
                println!(
                    "   #{} {} {} {:.2} [{}]",
                    booking.id,
                    booking.customer_name,
                    booking.car_name,
                    booking.total_price,
                    booking.status.label()
                );
            }
            Ok(())
        }
        AdminCommand::Bookings {
            search,
            status,
            date,
            set_status,
        } => {
            let filter = BookingFilter { search, status, date };
            let bookings = bookings_admin.list(None, &filter).await?;

            match set_status {
                Some(new_status) => {
                    let ids: Vec<String> = bookings.iter().map(|b| b.id.clone()).collect();
                    let report = bookings_admin.bulk_set_status(&ids, new_status).await;
                    println!(
                        "✅ {} booking(s) set to '{}', {} failed",
                        report.updated.len(),
                        new_status.label(),
                        report.failed.len()
                    );
                    for (id, reason) in &report.failed {
                        eprintln!("❌ {}: {}", id, reason);
                    }
                    Ok(())
                }
                None => print_json(&bookings),
            }
        }
        AdminCommand::Export { output, status } => {
            let filter = BookingFilter {
                status,
                ..Default::default()
            };
            let bookings = bookings_admin.list(None, &filter).await?;
            let file = std::fs::File::create(&output)?;
            let rows = export_bookings_csv(&bookings, file)?;
            println!("📁 {} booking(s) written to {}", rows, output.display());
            Ok(())
        }
    }
}

fn run_settings(command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show { file } => {
            let settings = match file {
                Some(path) => SystemSettings::from_file(path)?,
                None => SystemSettings::default(),
            };
            print!("{}", settings.to_toml_string()?);
            Ok(())
        }
        SettingsCommand::Validate { file } => {
            SystemSettings::from_file(&file)?.validate()?;
            println!("✅ {} is valid", file.display());
            Ok(())
        }
        SettingsCommand::Init { file } => {
            SystemSettings::default().save_to_file(&file)?;
            println!("✅ Default settings written to {}", file.display());
            Ok(())
        }
    }
}
