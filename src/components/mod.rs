// UI Components
// Presentational primitives and the profile view composer

pub mod icons;
pub mod profile_card;
pub mod profile_view;
pub mod skeleton;

pub use profile_view::ProfileView;
