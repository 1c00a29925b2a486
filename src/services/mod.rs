pub mod add_control;
pub mod cart_service;
pub mod notice_service;
pub mod payment_service;
pub mod pricing_service;
pub mod selection_service;
pub mod theme_service;
