//! Product listing command.

use marketplace_core::Price;
use marketplace_storefront::forms::ListingForm;
use marketplace_storefront::Result;

/// Validate a listing and echo the accepted draft.
///
/// Listings are not submitted anywhere yet.
#[allow(clippy::print_stdout)]
pub fn validate(
    name: String,
    description: String,
    price: String,
    category: String,
    location: String,
) -> Result<()> {
    let form = ListingForm {
        name,
        description,
        price,
        category,
        location,
    };
    let draft = form.validate()?;

    tracing::info!(name = %draft.name, category = %draft.category, "Listing validated");
    println!(
        "Listing ready: {} ({}) {} from {}",
        draft.name,
        draft.category,
        Price::local(draft.price),
        draft.location
    );
    Ok(())
}
