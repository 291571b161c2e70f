pub mod dimension_tree;
pub mod expand_state;
pub mod form_state;
pub mod forms;
pub mod keyed_lookup;
pub mod list_view;
