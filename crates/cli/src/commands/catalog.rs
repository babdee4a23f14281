//! Product listing command.

use marketplace_storefront::Storefront;

/// Print product cards, optionally filtered by `search`.
#[allow(clippy::print_stdout)]
pub async fn products(session: &Storefront, search: Option<&str>) {
    let products = session.products(search).await;

    if products.is_empty() {
        println!("No products found");
        return;
    }

    for product in &products {
        println!("[{}] {}  {}", product.id, product.name, product.price);
        println!("    {}", product.location);
        if let Some(category) = &product.category {
            println!("    {category}");
        }
        if let Some(description) = &product.description {
            println!("    {description}");
        }
    }
}
