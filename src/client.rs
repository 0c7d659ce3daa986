//! Client-side data layer for the catalog UI: HTTP access, the scrolling
//! list, mutation dialogs and the login session.

pub mod api;
pub mod dialog;
pub mod form;
pub mod list;
pub mod session;

#[cfg(test)]
mod testing;
