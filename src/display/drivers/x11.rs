//! Minimal X11 DisplayDriver built on Xlib.
//!
//! - Window creation at the configured size
//! - Keyboard, pointer, focus, resize and close events
//! - Framebuffer presentation via XPutImage on a 24-bit TrueColor visual

use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, RenderSnapshot,
};
use crate::keys::{KeySymbol, Modifiers};
use anyhow::{anyhow, Result};
use log::{debug, info, trace};
use std::ffi::CString;
use std::os::raw::{c_char, c_uint, c_void};
use std::ptr;
use x11::keysym::*;
use x11::xlib::*;

pub struct X11DisplayDriver {
    display: *mut Display,
    window: Window,
    gc: GC,
    visual: *mut Visual,
    wm_delete_window: Atom,
    width_px: u32,
    height_px: u32,
}

impl DisplayDriver for X11DisplayDriver {
    fn new() -> Result<Self> {
        info!("X11DisplayDriver::new() - Opening X11 display");

        // SAFETY: a null name makes Xlib use $DISPLAY; the result is checked.
        let display = unsafe { XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(anyhow!("Failed to open X11 display. Is DISPLAY set?"));
        }

        Ok(Self {
            display,
            window: 0,
            gc: ptr::null_mut(),
            visual: ptr::null_mut(),
            wm_delete_window: 0,
            width_px: 0,
            height_px: 0,
        })
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        match request {
            DriverRequest::Init(config) => self.handle_init(config),
            DriverRequest::PollEvents => Ok(self.handle_poll_events()),
            DriverRequest::Present(snapshot) => self.handle_present(snapshot),
            DriverRequest::SetTitle(title) => self.handle_set_title(&title),
        }
    }
}

impl X11DisplayDriver {
    fn handle_init(&mut self, config: DriverConfig) -> Result<DriverResponse, DisplayError> {
        if self.window != 0 {
            return Err(DisplayError::Unexpected("window already created".into()));
        }
        let title = CString::new(config.title.as_str())
            .map_err(|e| DisplayError::InitFailed(format!("invalid title: {}", e)))?;

        // SAFETY: `self.display` is a live connection opened in `new`; every
        // handle created here is released in `Drop`.
        unsafe {
            let screen = XDefaultScreen(self.display);
            let root = XRootWindow(self.display, screen);
            if XDefaultDepth(self.display, screen) != 24 {
                return Err(DisplayError::InitFailed(
                    "default visual is not 24-bit TrueColor".into(),
                ));
            }
            self.visual = XDefaultVisual(self.display, screen);

            self.window = XCreateSimpleWindow(
                self.display,
                root,
                0,
                0,
                config.window_width.max(1),
                config.window_height.max(1),
                0,
                XBlackPixel(self.display, screen),
                XBlackPixel(self.display, screen),
            );
            if self.window == 0 {
                return Err(DisplayError::InitFailed("failed to create window".into()));
            }

            XStoreName(self.display, self.window, title.as_ptr());
            XSelectInput(
                self.display,
                self.window,
                ExposureMask
                    | KeyPressMask
                    | ButtonPressMask
                    | PointerMotionMask
                    | FocusChangeMask
                    | StructureNotifyMask,
            );
            self.gc = XCreateGC(self.display, self.window, 0, ptr::null_mut());

            self.wm_delete_window = XInternAtom(
                self.display,
                b"WM_DELETE_WINDOW\0".as_ptr() as *const c_char,
                False,
            );
            let mut protocols = [self.wm_delete_window];
            XSetWMProtocols(self.display, self.window, protocols.as_mut_ptr(), 1);

            XMapWindow(self.display, self.window);
            XFlush(self.display);
        }

        self.width_px = config.window_width;
        self.height_px = config.window_height;
        info!(
            "X11DisplayDriver: Created window '{}' {}x{} px",
            config.title, self.width_px, self.height_px
        );

        Ok(DriverResponse::InitComplete {
            width_px: self.width_px,
            height_px: self.height_px,
        })
    }

    fn handle_poll_events(&mut self) -> DriverResponse {
        let mut events = Vec::new();
        if self.window == 0 {
            return DriverResponse::Events(events);
        }

        // SAFETY: XNextEvent fully initialises the zeroed event before use.
        unsafe {
            while XPending(self.display) > 0 {
                let mut event: XEvent = std::mem::zeroed();
                XNextEvent(self.display, &mut event);
                if let Some(display_event) = self.convert_event(&mut event) {
                    events.push(display_event);
                }
            }
        }

        DriverResponse::Events(events)
    }

    /// # Safety
    /// `event` must have been filled in by Xlib.
    unsafe fn convert_event(&mut self, event: &mut XEvent) -> Option<DisplayEvent> {
        match event.get_type() {
            KeyPress => {
                let mut buffer = [0 as c_char; 32];
                let mut keysym: KeySym = 0;
                XLookupString(
                    &mut event.key,
                    buffer.as_mut_ptr(),
                    buffer.len() as i32,
                    &mut keysym,
                    ptr::null_mut(),
                );
                Some(DisplayEvent::Key {
                    symbol: map_keysym(keysym),
                    modifiers: extract_modifiers(event.key.state),
                })
            }
            ButtonPress => {
                let button = event.button;
                Some(DisplayEvent::MouseButtonPress {
                    button: button.button.saturating_sub(1) as u8,
                    x: button.x,
                    y: button.y,
                    modifiers: extract_modifiers(button.state),
                })
            }
            MotionNotify => {
                let motion = event.motion;
                Some(DisplayEvent::MouseMove {
                    x: motion.x,
                    y: motion.y,
                    modifiers: extract_modifiers(motion.state),
                })
            }
            ConfigureNotify => {
                let configure = event.configure;
                let (width, height) = (configure.width as u32, configure.height as u32);
                if width == self.width_px && height == self.height_px {
                    return None;
                }
                self.width_px = width;
                self.height_px = height;
                debug!("X11DisplayDriver: Resized to {}x{}", width, height);
                Some(DisplayEvent::Resize {
                    width_px: width,
                    height_px: height,
                })
            }
            FocusIn => Some(DisplayEvent::FocusGained),
            FocusOut => Some(DisplayEvent::FocusLost),
            ClientMessage => {
                let atom = event.client_message.data.get_long(0) as Atom;
                (atom == self.wm_delete_window).then_some(DisplayEvent::CloseRequested)
            }
            _ => None,
        }
    }

    fn handle_present(&mut self, snapshot: RenderSnapshot) -> Result<DriverResponse, DisplayError> {
        trace!("X11DisplayDriver: Presenting frame");

        let expected = snapshot.width_px as usize * snapshot.height_px as usize * 4;
        if self.window == 0 || snapshot.framebuffer.len() != expected {
            let reason = format!(
                "framebuffer of {} bytes does not describe a {}x{} frame",
                snapshot.framebuffer.len(),
                snapshot.width_px,
                snapshot.height_px
            );
            return Err(DisplayError::PresentationFailed(snapshot, reason));
        }

        // SAFETY: the XImage borrows `snapshot.framebuffer`, which outlives it;
        // the data pointer is detached before the image header is freed so
        // Xlib never frees memory it does not own.
        unsafe {
            let image = XCreateImage(
                self.display,
                self.visual,
                24,
                ZPixmap,
                0,
                snapshot.framebuffer.as_ptr() as *mut c_char,
                snapshot.width_px,
                snapshot.height_px,
                32,
                0,
            );
            if image.is_null() {
                return Err(DisplayError::PresentationFailed(
                    snapshot,
                    "failed to create XImage".to_string(),
                ));
            }

            XPutImage(
                self.display,
                self.window,
                self.gc,
                image,
                0,
                0,
                0,
                0,
                snapshot.width_px,
                snapshot.height_px,
            );

            (*image).data = ptr::null_mut();
            XFree(image as *mut c_void);
            XFlush(self.display);
        }

        Ok(DriverResponse::PresentComplete(snapshot))
    }

    fn handle_set_title(&mut self, title: &str) -> Result<DriverResponse, DisplayError> {
        let c_title = CString::new(title)
            .map_err(|e| DisplayError::Unexpected(format!("invalid title: {}", e)))?;
        if self.window != 0 {
            // SAFETY: window belongs to this live display connection.
            unsafe {
                XStoreName(self.display, self.window, c_title.as_ptr());
                XFlush(self.display);
            }
        }
        Ok(DriverResponse::TitleSet)
    }
}

fn map_keysym(keysym: KeySym) -> KeySymbol {
    let keysym = keysym as c_uint;
    match keysym {
        XK_BackSpace => KeySymbol::Backspace,
        XK_Tab | XK_ISO_Left_Tab => KeySymbol::Tab,
        XK_Return => KeySymbol::Enter,
        XK_Escape => KeySymbol::Escape,
        XK_Delete => KeySymbol::Delete,
        XK_Home => KeySymbol::Home,
        XK_Left => KeySymbol::Left,
        XK_Up => KeySymbol::Up,
        XK_Right => KeySymbol::Right,
        XK_Down => KeySymbol::Down,
        XK_Page_Up => KeySymbol::PageUp,
        XK_Page_Down => KeySymbol::PageDown,
        XK_End => KeySymbol::End,
        XK_Insert => KeySymbol::Insert,
        XK_Print => KeySymbol::PrintScreen,
        XK_Scroll_Lock => KeySymbol::ScrollLock,
        XK_Pause => KeySymbol::Pause,
        XK_Menu => KeySymbol::Menu,
        XK_Shift_L | XK_Shift_R => KeySymbol::Shift,
        XK_Control_L | XK_Control_R => KeySymbol::Control,
        XK_Alt_L | XK_Alt_R | XK_Meta_L | XK_Meta_R => KeySymbol::Alt,
        XK_Super_L | XK_Super_R => KeySymbol::Super,
        XK_Caps_Lock => KeySymbol::CapsLock,
        XK_Num_Lock => KeySymbol::NumLock,
        XK_KP_0 | XK_KP_Insert => KeySymbol::Keypad0,
        XK_KP_1 | XK_KP_End => KeySymbol::Keypad1,
        XK_KP_2 | XK_KP_Down => KeySymbol::Keypad2,
        XK_KP_3 | XK_KP_Page_Down => KeySymbol::Keypad3,
        XK_KP_4 | XK_KP_Left => KeySymbol::Keypad4,
        XK_KP_5 | XK_KP_Begin => KeySymbol::Keypad5,
        XK_KP_6 | XK_KP_Right => KeySymbol::Keypad6,
        XK_KP_7 | XK_KP_Home => KeySymbol::Keypad7,
        XK_KP_8 | XK_KP_Up => KeySymbol::Keypad8,
        XK_KP_9 | XK_KP_Page_Up => KeySymbol::Keypad9,
        XK_KP_Enter => KeySymbol::KeypadEnter,
        XK_KP_Add => KeySymbol::KeypadPlus,
        XK_KP_Subtract => KeySymbol::KeypadMinus,
        XK_KP_Multiply => KeySymbol::KeypadMultiply,
        XK_KP_Divide => KeySymbol::KeypadDivide,
        XK_KP_Decimal | XK_KP_Delete => KeySymbol::KeypadDecimal,
        XK_F1 => KeySymbol::F1,
        XK_F2 => KeySymbol::F2,
        XK_F3 => KeySymbol::F3,
        XK_F4 => KeySymbol::F4,
        XK_F5 => KeySymbol::F5,
        XK_F6 => KeySymbol::F6,
        XK_F7 => KeySymbol::F7,
        XK_F8 => KeySymbol::F8,
        XK_F9 => KeySymbol::F9,
        XK_F10 => KeySymbol::F10,
        XK_F11 => KeySymbol::F11,
        XK_F12 => KeySymbol::F12,
        XK_F13 => KeySymbol::F13,
        XK_F14 => KeySymbol::F14,
        XK_F15 => KeySymbol::F15,
        XK_F16 => KeySymbol::F16,
        XK_F17 => KeySymbol::F17,
        XK_F18 => KeySymbol::F18,
        XK_F19 => KeySymbol::F19,
        XK_F20 => KeySymbol::F20,
        XK_F21 => KeySymbol::F21,
        XK_F22 => KeySymbol::F22,
        XK_F23 => KeySymbol::F23,
        XK_F24 => KeySymbol::F24,
        // Latin-1 keysyms coincide with their code points.
        0x20..=0x7e | 0xa0..=0xff => KeySymbol::Char(char::from(keysym as u8)),
        _ => KeySymbol::Unknown,
    }
}

fn extract_modifiers(state: c_uint) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    if state & ShiftMask != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if state & ControlMask != 0 {
        modifiers |= Modifiers::CONTROL;
    }
    if state & Mod1Mask != 0 {
        modifiers |= Modifiers::ALT;
    }
    if state & Mod4Mask != 0 {
        modifiers |= Modifiers::SUPER;
    }
    if state & LockMask != 0 {
        modifiers |= Modifiers::CAPS_LOCK;
    }
    if state & Mod2Mask != 0 {
        modifiers |= Modifiers::NUM_LOCK;
    }
    modifiers
}

impl Drop for X11DisplayDriver {
    fn drop(&mut self) {
        info!("X11DisplayDriver::drop() - Cleaning up");
        // SAFETY: each handle is released at most once, in reverse creation order.
        unsafe {
            if !self.gc.is_null() {
                XFreeGC(self.display, self.gc);
            }
            if self.window != 0 {
                XDestroyWindow(self.display, self.window);
            }
            if !self.display.is_null() {
                XCloseDisplay(self.display);
            }
        }
    }
}
