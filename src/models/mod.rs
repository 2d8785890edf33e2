mod bar;
mod overlay;
mod series;
mod timeframe;

pub use bar::Bar;
pub use overlay::{IndicatorOverlay, OverlayPoint};
pub use series::Series;
pub use timeframe::Timeframe;
