pub mod enums;
pub mod episode;
pub mod medication;
pub mod settings;

pub use enums::*;
pub use episode::*;
pub use medication::*;
pub use settings::*;
