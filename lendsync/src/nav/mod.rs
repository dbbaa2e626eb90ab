//! Throttled, serialized programmatic navigation.

mod throttle;

pub use throttle::{
    DEFAULT_NAVIGATION_SPACING, NavigateOptions, NavigationRequest, NavigationSink,
    NavigationThrottler,
};
