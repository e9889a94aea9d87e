// Vkbd State Module
// Storage for the virtual keys a keyboard owns

pub mod registry;

pub use registry::KeyRegistry;
