use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::debug;

use retrend_core::chat::SubmitOutcome;
use retrend_core::models::{ConversationKey, LocationPreference, Product, Profile};
use retrend_core::session::{Route, RouteMatch};
use retrend_core::shell::{ShellMode, ShellView};
use retrend_core::NavigationShell;

use super::args::{Commands, LocationCommand, WishlistCommand};
use super::chat::run_chat;
use super::output::Printer;

const MAINTENANCE_NOTICE: &str = "ReTrend is under maintenance. Please try again later.";

/// Execute one subcommand against a booted shell
pub async fn run(command: Commands, shell: &mut NavigationShell, printer: Printer) -> Result<()> {
    debug!(?command, "running command");
    match command {
        Commands::Status => status(shell, printer),
        Commands::Route { path } => {
            let view = shell.resolve(&path);
            printer.emit(&view_json(&view), &[describe_view(&view)])
        }
        Commands::Whoami => whoami(shell, printer),
        Commands::Logout => {
            let view = shell.logout()?;
            printer.emit(
                &json!({ "loggedOut": true, "view": view_json(&view) }),
                &["Logged out".to_string(), describe_view(&view)],
            )
        }
        Commands::Location { command } => location(shell, command, printer),
        Commands::Login { email, password } => {
            ensure_online(shell)?;
            let session = shell.auth().login(&email, &password).await?;
            signed_in(&session.profile, printer)
        }
        Commands::GoogleLogin { id_token } => {
            ensure_online(shell)?;
            let session = shell.auth().google_auth(&id_token).await?;
            signed_in(&session.profile, printer)
        }
        Commands::PhoneLogin { id_token, phone } => {
            ensure_online(shell)?;
            let session = shell.auth().phone_auth(&id_token, &phone).await?;
            signed_in(&session.profile, printer)
        }
        Commands::Register {
            name,
            email,
            password,
            confirm,
        } => {
            ensure_online(shell)?;
            shell.auth().register(&name, &email, &password, &confirm).await?;
            printer.emit(
                &json!({ "registered": true, "email": email }),
                &[format!("Account created for {}. Sign in with `retrend login`.", email)],
            )
        }
        Commands::Send {
            peer,
            text,
            listing,
        } => {
            ensure_online(shell)?;
            let mut composer = shell.composer(ConversationKey::new(listing, peer));
            composer.set_input(text);
            match composer.submit().await {
                SubmitOutcome::Sent => printer.emit(&json!({ "sent": true }), &["Sent".to_string()]),
                SubmitOutcome::Skipped => bail!("Nothing to send"),
                SubmitOutcome::Rejected { notice } => bail!(notice),
                SubmitOutcome::Failed(e) => Err(e).context("Failed to send message"),
            }
        }
        Commands::Chat { peer, listing } => {
            ensure_online(shell)?;
            run_chat(shell, ConversationKey::new(listing, peer), printer).await
        }
        Commands::Unread => {
            ensure_online(shell)?;
            unread(shell, printer).await
        }
        Commands::Wishlist { command } => {
            ensure_online(shell)?;
            wishlist(shell, command, printer).await
        }
        Commands::Products => {
            ensure_online(shell)?;
            let listings = shell.listings();
            let location = listings.location();
            let products = listings.feed().await?;
            let mut lines = vec![format!("{} listings in {}", products.len(), location.name)];
            lines.extend(products.iter().map(product_line));
            printer.emit(&json!({ "location": location.name, "products": products }), &lines)
        }
    }
}

fn ensure_online(shell: &NavigationShell) -> Result<()> {
    if shell.mode() == ShellMode::Maintenance {
        bail!(MAINTENANCE_NOTICE);
    }
    Ok(())
}

fn status(shell: &NavigationShell, printer: Printer) -> Result<()> {
    let online = shell.mode() == ShellMode::Online;
    let profile = shell.profile();
    let counts = shell.counts();
    let mut lines = vec![
        format!("Backend:  {}", shell.config().api_base_url),
        format!("Mode:     {}", if online { "online" } else { "maintenance" }),
    ];
    match &profile {
        Some(profile) => lines.push(format!("Session:  {}", profile.email)),
        None => lines.push("Session:  not logged in".to_string()),
    }
    printer.emit(
        &json!({
            "apiBaseUrl": shell.config().api_base_url,
            "online": online,
            "authenticated": shell.auth_state().is_authenticated(),
            "email": profile.map(|p| p.email),
            "counts": counts,
        }),
        &lines,
    )
}

fn whoami(shell: &NavigationShell, printer: Printer) -> Result<()> {
    match shell.profile() {
        Some(profile) => {
            let lines = profile_lines(&profile);
            printer.emit(&profile, &lines)
        }
        None => printer.emit(&json!(null), &["Not logged in".to_string()]),
    }
}

fn signed_in(profile: &Profile, printer: Printer) -> Result<()> {
    printer.emit(profile, &[format!("Logged in as {} <{}>", profile.name, profile.email)])
}

async fn unread(shell: &NavigationShell, printer: Printer) -> Result<()> {
    let session = shell.session();
    let token = session.token().context("Not logged in")?;
    let unread = match shell.api().unread_count(&token).await {
        Ok(count) => count,
        Err(e) => {
            if e.is_unauthorized() {
                session.invalidate();
            }
            return Err(e).context("Failed to fetch unread count");
        }
    };
    let wishlist = shell.wishlist().items().await?.len();
    printer.emit(
        &json!({ "unreadMessages": unread, "wishlist": wishlist }),
        &[
            format!("Unread messages: {}", unread),
            format!("Wishlist:        {}", wishlist),
        ],
    )
}

async fn wishlist(shell: &NavigationShell, command: WishlistCommand, printer: Printer) -> Result<()> {
    let service = shell.wishlist();
    match command {
        WishlistCommand::List => {
            let entries = service.items().await?;
            let lines = if entries.is_empty() {
                vec!["Your wishlist is empty".to_string()]
            } else {
                entries
                    .iter()
                    .filter_map(|entry| entry.product.as_ref())
                    .map(product_line)
                    .collect()
            };
            printer.emit(&entries, &lines)
        }
        WishlistCommand::Add { product_id } => {
            service.add(&product_id).await?;
            printer.emit(
                &json!({ "productId": product_id, "inWishlist": true }),
                &[format!("Added {} to your wishlist", product_id)],
            )
        }
        WishlistCommand::Remove { product_id } => {
            service.remove(&product_id).await?;
            printer.emit(
                &json!({ "productId": product_id, "inWishlist": false }),
                &[format!("Removed {} from your wishlist", product_id)],
            )
        }
    }
}

fn location(shell: &NavigationShell, command: LocationCommand, printer: Printer) -> Result<()> {
    let listings = shell.listings();
    match command {
        LocationCommand::Show => {
            let location = listings.location();
            let line = format!("Location: {}", location.name);
            printer.emit(&location, &[line])
        }
        LocationCommand::Set { name } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("Location name cannot be empty");
            }
            let location = LocationPreference::named(name);
            listings
                .set_location(&location)
                .context("Failed to save location")?;
            printer.emit(&location, &[format!("Location set to {}", location.name)])
        }
    }
}

pub(crate) fn product_line(product: &Product) -> String {
    let mut line = format!("{}  {}", product.id, product.title);
    let price = product.price_label();
    if !price.is_empty() {
        line.push_str(&format!("  ₹{}", price));
    }
    if let Some(location) = &product.location {
        line.push_str(&format!("  ({})", location));
    }
    line
}

fn profile_lines(profile: &Profile) -> Vec<String> {
    let mut lines = vec![
        format!("Name:  {}", profile.name),
        format!("Email: {}", profile.email),
    ];
    if !profile.phone.is_empty() {
        lines.push(format!("Phone: {}", profile.phone));
    }
    lines
}

fn view_json(view: &ShellView) -> serde_json::Value {
    match view {
        ShellView::Maintenance => json!({ "view": "maintenance" }),
        ShellView::Route(RouteMatch::View(route)) => {
            json!({ "view": "route", "route": route_name(route), "guarded": route.is_guarded() })
        }
        ShellView::Route(RouteMatch::LoginPrompt(route)) => {
            json!({ "view": "login", "route": route_name(route) })
        }
        ShellView::Route(RouteMatch::NotFound) => json!({ "view": "notFound" }),
    }
}

fn describe_view(view: &ShellView) -> String {
    match view {
        ShellView::Maintenance => MAINTENANCE_NOTICE.to_string(),
        ShellView::Route(RouteMatch::View(route)) => format!("View: {}", route_name(route)),
        ShellView::Route(RouteMatch::LoginPrompt(route)) => {
            format!("Login required for {}", route_name(route))
        }
        ShellView::Route(RouteMatch::NotFound) => "Page not found".to_string(),
    }
}

fn route_name(route: &Route) -> String {
    match route {
        Route::Home => "home".to_string(),
        Route::AdSuccess => "ad-success".to_string(),
        Route::PreviewAd { id } => format!("preview-ad {}", id),
        Route::SellForm { category, item } => format!("sell-form {}/{}", category, item),
        Route::Chat { conversation: None } => "chat".to_string(),
        Route::Chat {
            conversation: Some((id, peer)),
        } => format!("chat {} with {}", id, peer),
        Route::MobileChat { id, peer } => format!("mobile-chat {} with {}", id, peer),
        Route::EditProfile => "edit-profile".to_string(),
        Route::Profile => "profile".to_string(),
        Route::MyAds => "my-ads".to_string(),
        Route::Sell => "sell".to_string(),
        Route::Wishlist => "wishlist".to_string(),
        Route::SearchResults => "search-results".to_string(),
        Route::PublicProfile { email } => format!("public-profile {}", email),
        Route::Category { name } => format!("category {}", name),
    }
}
