//! Client-side state: who is signed in, and what board is on screen.

pub mod auth;
pub mod view;
