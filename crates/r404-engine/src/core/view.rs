use crate::input::PointerButtonEvent;

/// Page contract implemented by higher layers.
///
/// The runtime calls `on_mount` once the window is visible, forwards pointer
/// presses, and calls `on_unmount` before the window goes away. `on_unmount` is
/// always the last call a view receives.
pub trait View {
    fn on_mount(&mut self);

    /// Pointer button pressed or released inside the window.
    fn on_pointer(&mut self, event: PointerButtonEvent) {
        let _ = event;
    }

    fn on_unmount(&mut self);
}
