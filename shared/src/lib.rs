//! Shared core of the travel journal: trip list, trip editing with
//! confirmation, profile editing and the signed-in session.
//!
//! Shells drive it through [`Event`]s, perform the [`Effect`]s it requests,
//! and draw the [`ViewModel`].

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod model;
pub mod profile;
pub mod session;
pub mod trips;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::Config;
pub use crux_core::{render::Render, App as CruxApp};
pub use event::{Event, IssuedToken};
pub use model::{AuthUser, Model, Trip, TripAuthor, TripId};
pub use view::ViewModel;
