mod keyboard;
pub use self::keyboard::KeyboardHandler;
