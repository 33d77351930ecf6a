pub mod image_loader;
pub mod session_loader;

pub use image_loader::{load_image, load_images_from_folder};
pub use session_loader::{load_session, restore_store, save_session, SessionManifest, SessionRow};
