//! Plugin Runtime Tests
//!
//! Manager lifecycle, resolution and discovery tests driven through mock
//! isolation contexts.
