//! Command runners.
//!
//! Each runner wires the session services to the HTTP clients, does its
//! work, and prints a plain-text report.  Protected commands bail early
//! with a login hint when no session token is stored; a token that expires
//! mid-command is dropped before the error surfaces, so the next command
//! starts cleanly signed out.

use anyhow::{Context, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use martkit_core::address::{AddressBook, AddressForm};
use martkit_core::cart::CartService;
use martkit_core::checkout::CheckoutService;
use martkit_core::error::StoreError;
use martkit_core::orders::OrderHistory;
use martkit_core::session::AuthSession;
use martkit_core::verification::PhoneVerification;
use martkit_sdk::client::{AuthClient, CatalogClient, ShopperClient};
use martkit_sdk::objects::auth::User;
use martkit_sdk::objects::catalog::ProductQuery;

use crate::collect::PromptCollector;
use crate::config::FileConfig;
use crate::token::FileTokenStore;

fn session(config: &FileConfig) -> AuthSession<AuthClient, FileTokenStore> {
    AuthSession::new(
        AuthClient::new(config.api.base_url.clone()),
        FileTokenStore::new(config.api.token_file.clone()),
    )
}

/// A restored session plus the shopper client built from its token.
struct Authed {
    session: AuthSession<AuthClient, FileTokenStore>,
    shopper: ShopperClient,
    user: User,
}

impl Authed {
    /// Surface a service failure.  An expired session also drops the
    /// stored token, whichever call reported it.
    async fn check<T>(&self, result: Result<T, StoreError>) -> anyhow::Result<T> {
        if let Err(StoreError::AuthExpired) = &result {
            self.session.expire().await;
        }
        result.map_err(Into::into)
    }
}

/// Restore the signed-in user and a shopper client for their token.
async fn signed_in(config: &FileConfig) -> anyhow::Result<Authed> {
    let session = session(config);
    let user = session
        .load_user()
        .await?
        .context("not signed in; run `martkit login <email> <password>`")?;
    let token = session
        .token()
        .await
        .context("not signed in; run `martkit login <email> <password>`")?;
    let shopper = ShopperClient::new(config.api.base_url.clone(), token);
    Ok(Authed {
        session,
        shopper,
        user,
    })
}

// ---------------------------------------------------------------- account

pub async fn register(
    config: &FileConfig,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    session(config).register(name, email, password).await?;
    println!("account created; check {email} for the verification link, then log in");
    Ok(())
}

pub async fn login(config: &FileConfig, email: &str, password: &str) -> anyhow::Result<()> {
    let user = session(config).login(email, password).await?;
    println!("signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn logout(config: &FileConfig) -> anyhow::Result<()> {
    session(config).logout().await;
    println!("signed out");
    Ok(())
}

pub async fn whoami(config: &FileConfig) -> anyhow::Result<()> {
    let authed = signed_in(config).await?;
    let user = &authed.user;
    println!("{} <{}> (id {})", user.name, user.email, user.id);
    Ok(())
}

pub async fn change_password(
    config: &FileConfig,
    old_password: &str,
    new_password: &str,
) -> anyhow::Result<()> {
    let session = session(config);
    session
        .load_user()
        .await?
        .context("not signed in; run `martkit login <email> <password>`")?;
    session.update_password(old_password, new_password).await?;
    println!("password updated");
    Ok(())
}

// ---------------------------------------------------------------- catalog

pub async fn products(
    config: &FileConfig,
    search: Option<String>,
    category: Option<String>,
    page: u32,
) -> anyhow::Result<()> {
    let catalog = CatalogClient::new(config.api.base_url.clone());
    let query = ProductQuery {
        search,
        page: Some(page),
        limit: None,
        category: category.map(Into::into),
    };
    let page = catalog.list_products(&query).await?;

    for product in &page.products {
        let price = match product.discount_price {
            Some(d) if !d.is_zero() && d < product.price => {
                format!("{d} (was {})", product.price)
            }
            _ => product.price.to_string(),
        };
        println!("{}  {}  {}", product.id, price, product.name);
    }
    if let (Some(current), Some(total)) = (page.current_page, page.total_pages) {
        println!("page {current} of {total}");
    }
    Ok(())
}

pub async fn categories(config: &FileConfig) -> anyhow::Result<()> {
    let catalog = CatalogClient::new(config.api.base_url.clone());
    for category in catalog.list_categories().await?.categories {
        println!("{}  {}", category.slug, category.name);
    }
    Ok(())
}

// ------------------------------------------------------------------- cart

/// Build a cart service already holding the server-side cart.
async fn loaded_cart(config: &FileConfig) -> anyhow::Result<(Authed, CartService<ShopperClient>)> {
    let authed = signed_in(config).await?;
    let cart = CartService::new(authed.shopper.clone(), authed.session.subscribe());
    authed.check(cart.refresh().await).await?;
    Ok((authed, cart))
}

fn print_cart(cart: &CartService<ShopperClient>) {
    let snapshot = cart.snapshot();
    if snapshot.items.is_empty() {
        println!("cart is empty");
        return;
    }
    for item in &snapshot.items {
        let price = martkit_core::pricing::effective_price(item);
        println!(
            "{}  x{}  @{}  {}",
            item.product_id, item.quantity, price, item.name
        );
    }
    let totals = cart.totals();
    println!("subtotal  {}", totals.subtotal);
    println!("discount  {}", totals.discount);
    println!("delivery  {}", totals.delivery_fee);
    println!("total     {}", totals.total);
}

pub async fn cart_show(config: &FileConfig) -> anyhow::Result<()> {
    let (_, cart) = loaded_cart(config).await?;
    print_cart(&cart);
    Ok(())
}

pub async fn cart_add(config: &FileConfig, product_id: &str, quantity: u32) -> anyhow::Result<()> {
    let (authed, cart) = loaded_cart(config).await?;
    authed.check(cart.add(product_id, quantity).await).await?;
    print_cart(&cart);
    Ok(())
}

pub async fn cart_remove(config: &FileConfig, product_id: &str) -> anyhow::Result<()> {
    let (authed, cart) = loaded_cart(config).await?;
    authed.check(cart.remove(product_id).await).await?;
    print_cart(&cart);
    Ok(())
}

pub async fn cart_set(config: &FileConfig, product_id: &str, quantity: u32) -> anyhow::Result<()> {
    let (authed, cart) = loaded_cart(config).await?;
    authed
        .check(cart.set_quantity(product_id, quantity).await)
        .await?;
    print_cart(&cart);
    Ok(())
}

pub async fn cart_clear(config: &FileConfig) -> anyhow::Result<()> {
    let (authed, cart) = loaded_cart(config).await?;
    authed.check(cart.clear().await).await?;
    println!("cart cleared");
    Ok(())
}

// -------------------------------------------------------------- addresses

pub struct NewAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub phone: String,
}

pub async fn address_list(config: &FileConfig) -> anyhow::Result<()> {
    let authed = signed_in(config).await?;
    let book = AddressBook::new(authed.shopper.clone());
    authed.check(book.refresh().await).await?;
    let addresses = book.addresses();
    if addresses.is_empty() {
        println!("no saved addresses");
        return Ok(());
    }
    for a in addresses {
        println!(
            "{}  {}, {}, {} {}, {}  ({}, {})",
            a.id, a.address, a.city, a.state, a.postal_code, a.country, a.full_name, a.phone_number
        );
    }
    Ok(())
}

pub async fn address_add(config: &FileConfig, new: NewAddress) -> anyhow::Result<()> {
    let authed = signed_in(config).await?;

    // The phone number must pass OTP verification before the address can
    // be saved against it.
    let mut verification = PhoneVerification::new(authed.shopper.clone());
    authed.check(verification.send_code(&new.phone).await).await?;
    println!("a verification code was sent to {}", new.phone);
    loop {
        let code = read_line("code (empty to abort)").await?;
        if code.is_empty() {
            bail!("phone verification aborted");
        }
        match verification.verify_code(&code).await {
            Ok(()) => break,
            Err(err @ StoreError::AuthExpired) => return authed.check(Err(err)).await,
            Err(err) => println!("verification failed ({err}); try again"),
        }
    }
    let phone = verification
        .verified_phone()
        .context("phone number is not verified")?
        .to_owned();

    let book = AddressBook::new(authed.shopper.clone());
    let form = AddressForm {
        full_name: new.full_name,
        address: new.address,
        city: new.city,
        state: new.state,
        country: new.country,
        postal_code: new.postal_code,
        phone_number: phone,
    };
    authed.check(book.create(&form).await).await?;
    println!("address saved ({} on file)", book.addresses().len());
    Ok(())
}

pub async fn address_delete(config: &FileConfig, id: &str) -> anyhow::Result<()> {
    let authed = signed_in(config).await?;
    let book = AddressBook::new(authed.shopper.clone());
    authed.check(book.refresh().await).await?;
    authed.check(book.delete(id).await).await?;
    println!("address deleted ({} remaining)", book.addresses().len());
    Ok(())
}

// --------------------------------------------------------------- checkout

pub async fn checkout(config: &FileConfig, address_id: Option<&str>) -> anyhow::Result<()> {
    let (authed, cart) = loaded_cart(config).await?;

    let book = AddressBook::new(authed.shopper.clone());
    authed.check(book.refresh().await).await?;
    let address = match address_id {
        Some(id) => book
            .get(id)
            .with_context(|| format!("no saved address with id {id}"))?,
        None => book
            .addresses()
            .into_iter()
            .next()
            .context("no saved addresses; run `martkit address add` first")?,
    };

    print_cart(&cart);
    println!(
        "delivering to {}, {}, {} {}",
        address.address, address.city, address.state, address.postal_code
    );

    let collector = PromptCollector {
        merchant_name: config
            .gateway
            .merchant_name
            .clone()
            .unwrap_or_else(|| "martkit".to_owned()),
        key_id: config.gateway.key_id.clone(),
    };
    let service = CheckoutService::new(authed.shopper.clone(), collector);
    let placed = authed
        .check(service.place_order(&cart, Some(&address), &authed.user).await)
        .await?;
    println!("payment verified; order {} placed", placed.order_id);
    Ok(())
}

// ----------------------------------------------------------------- orders

pub async fn orders(config: &FileConfig) -> anyhow::Result<()> {
    let authed = signed_in(config).await?;
    let history = OrderHistory::new(authed.shopper.clone());
    authed.check(history.refresh().await).await?;
    let orders = history.orders();
    if orders.is_empty() {
        println!("no orders yet");
        return Ok(());
    }
    for order in orders {
        println!(
            "{}  {}  {:?}  {} item(s)  total {}",
            order.id,
            order.created_at.date(),
            order.status,
            order.items.len(),
            order.total
        );
    }
    Ok(())
}

async fn read_line(label: &str) -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{label}: ").as_bytes()).await?;
    stdout.flush().await?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line.trim().to_owned())
}
