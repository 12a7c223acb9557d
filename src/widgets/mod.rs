//! Page widgets outside the i18n core: counters, filters, the contact form,
//! the partner carousel and the charts.

pub mod carousel;
pub mod charts;
pub mod contact;
pub mod counter;
pub mod filters;

pub use carousel::{CarouselLibrary, CarouselOptions, TracingCarousel};
pub use charts::{ChartLibrary, TracingCharts};
pub use contact::ContactForms;
pub use counter::{CounterSettings, Counters};
