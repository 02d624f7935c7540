//! A bounding volume hierarchy over triangle meshes, built top-down with center splits and
//! queried with rays.
//!
//! ```
//! use glam::vec3a;
//! use prt_bvh::{bvh::BvhTree, ray::Ray, test_util::geometry::cube};
//!
//! let (indices, vertices) = cube();
//! let bvh = BvhTree::build(&indices, &vertices).unwrap();
//! let hit = bvh
//!     .intersect(Ray::new_inf(vec3a(0.1, 0.2, 5.0), vec3a(0.0, 0.0, -1.0)))
//!     .unwrap();
//! assert_eq!(hit.t, 4.5);
//! ```

use std::time::{Duration, Instant};

pub mod aabb;
pub mod builder;
pub mod bvh;
pub mod error;
pub mod mesh;
pub mod ray;
pub mod sampler;
pub mod test_util;
pub mod triangle;
pub mod visibility;

pub use builder::BuildParams;
pub use bvh::{BvhNode, BvhTree};
pub use error::{BvhError, Result};

/// Opens a `profiling` scope when the `profile` feature is enabled. Noop otherwise.
#[macro_export]
macro_rules! scope {
    ($name:expr) => {
        #[cfg(feature = "profile")]
        profiling::scope!($name);
    };
}

/// [`scope!`], and logs the time spent until the end of the enclosing block at debug level when
/// the `scope_print` feature is enabled.
#[macro_export]
macro_rules! scope_print {
    ($name:expr) => {
        $crate::scope!($name);
        #[cfg(feature = "scope_print")]
        let _scope_timer = $crate::ScopeTimer::new($name);
    };
}

/// Like [`scope_print!`] but enabled by `scope_print_major`, for the few top level phases.
#[macro_export]
macro_rules! scope_print_major {
    ($name:expr) => {
        $crate::scope!($name);
        #[cfg(feature = "scope_print_major")]
        let _scope_timer = $crate::ScopeTimer::new($name);
    };
}

/// Logs its lifetime on drop. Created by the `scope_print` macros.
#[doc(hidden)]
pub struct ScopeTimer {
    name: &'static str,
    start: Instant,
}

impl ScopeTimer {
    #[inline(always)]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopeTimer {
    fn drop(&mut self) {
        log::debug!("{}: {}", self.name, PrettyDuration(self.start.elapsed()));
    }
}

/// A wrapper struct for `std::time::Duration` to provide pretty-printing of durations.
#[doc(hidden)]
pub struct PrettyDuration(pub Duration);

impl std::fmt::Display for PrettyDuration {
    /// Durations are formatted as follows:
    /// - If the duration is greater than or equal to 1 second, it is formatted in seconds (s).
    /// - If the duration is greater than or equal to 1 millisecond but less than 1 second, it is formatted in milliseconds (ms).
    /// - If the duration is less than 1 millisecond, it is formatted in microseconds (µs).
    ///   In the case of seconds & milliseconds, the duration is always printed with a precision of two decimal places.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration = self.0;
        if duration.as_secs() > 0 {
            let seconds =
                duration.as_secs() as f64 + f64::from(duration.subsec_nanos()) / 1_000_000_000.0;
            write!(f, "{seconds:.2}s ")
        } else if duration.subsec_millis() > 0 {
            let milliseconds =
                duration.as_millis() as f64 + f64::from(duration.subsec_micros() % 1_000) / 1_000.0;
            write!(f, "{milliseconds:.2}ms")
        } else {
            let microseconds = duration.as_micros();
            write!(f, "{microseconds}µs")
        }
    }
}
