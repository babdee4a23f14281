//! Cart commands.

use marketplace_core::{ProductId, QuantityChange};
use marketplace_storefront::views::{CartView, EMPTY_CART_MESSAGE};
use marketplace_storefront::{Result, Storefront};

#[allow(clippy::print_stdout)]
fn print_cart(cart: &CartView) {
    if cart.is_empty() {
        println!("{EMPTY_CART_MESSAGE}");
        return;
    }

    for item in &cart.items {
        println!(
            "[{}] {} x{}  {} each  {}",
            item.id, item.name, item.quantity, item.price, item.line_price
        );
    }
    println!();
    println!("Subtotal:      {}", cart.subtotal);
    println!("Delivery fee:  {}", cart.delivery_fee);
    println!("Total:         {}", cart.total);
}

/// Show the cart.
pub fn show(session: &Storefront) {
    print_cart(&session.cart_view());
}

/// Add one unit of a product.
#[allow(clippy::print_stdout)]
pub async fn add(session: &mut Storefront, id: ProductId) -> Result<()> {
    let quantity = session.add_to_cart(id).await?;
    println!("Added product {id} to cart (quantity {quantity})");
    Ok(())
}

/// Remove a product.
#[allow(clippy::print_stdout)]
pub fn remove(session: &mut Storefront, id: ProductId) -> Result<()> {
    session.remove_from_cart(id)?;
    print_cart(&session.cart_view());
    Ok(())
}

/// Change a product's quantity.
#[allow(clippy::print_stdout)]
pub fn update(session: &mut Storefront, id: ProductId, delta: i64) -> Result<()> {
    match session.update_quantity(id, delta)? {
        QuantityChange::Missing => println!("Product {id} is not in the cart"),
        QuantityChange::Updated(quantity) => println!("Product {id} quantity is now {quantity}"),
        QuantityChange::Removed => println!("Removed product {id} from cart"),
    }
    Ok(())
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub fn clear(session: &mut Storefront) -> Result<()> {
    session.clear_cart()?;
    println!("{EMPTY_CART_MESSAGE}");
    Ok(())
}

/// Show the totals and proceed to checkout.
#[allow(clippy::print_stdout)]
pub fn checkout(session: &Storefront) -> Result<()> {
    let cart = session.checkout()?;
    print_cart(&cart);
    println!();
    println!("Proceeding to checkout...");
    Ok(())
}
