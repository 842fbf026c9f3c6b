//! UI Components
//!
//! Leptos components for the wishlist screens.

mod header;
mod item_image;
mod item_card;
mod detail_page;
mod item_form;
mod floating_button;

pub use header::Header;
pub use item_image::ItemImage;
pub use item_card::ItemCard;
pub use detail_page::DetailPage;
pub use item_form::ItemForm;
pub use floating_button::FloatingButton;
