pub mod category_filter;
pub mod dashboard;
pub mod detail_panel;
pub mod location_form;
pub mod location_store;
pub mod map_surface;
pub mod session;
pub mod statistics;

#[cfg(test)]
pub(crate) mod test_support;
