pub mod reload;
pub mod search;
pub mod suggest;

pub use reload::*;
pub use search::*;
pub use suggest::*;
