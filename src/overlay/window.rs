use crate::error::WindowCreationError;
use serde::{Deserialize, Serialize};

/// Screen-space rectangle the overlay covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenRect {
    /// Oversized so that a single overlay covers most desktop layouts.
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 3840,
            height: 2160,
        }
    }
}

impl ScreenRect {
    pub fn contains(&self, point: (i32, i32)) -> bool {
        point.0 >= self.x
            && point.0 < self.x + self.width
            && point.1 >= self.y
            && point.1 < self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down,
    Move,
    Up,
}

/// Pointer input in window-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSample {
    pub point: (i32, i32),
    pub event: PointerEvent,
}

/// Window-manager operations the overlay controller needs from the OS.
pub trait WindowBackend {
    /// Builds the borderless, transparent, topmost, non-activating window. Initially hidden.
    fn create(&mut self, rect: ScreenRect) -> Result<(), WindowCreationError>;
    /// Shows the window without taking input focus.
    fn show_inactive(&mut self);
    fn hide(&mut self);
    /// `true` lets pointer input pass through to the windows underneath.
    fn set_ignore_mouse_events(&mut self, ignore: bool);
    /// Runs `f` over the BGRA bitmap backing the window. Returns `false` when there is none.
    fn with_bitmap_mut(&mut self, f: &mut dyn FnMut(&mut [u8], u32, u32)) -> bool;
    fn request_paint(&mut self);
    fn drain_pointer_events(&mut self) -> Vec<PointerSample> {
        Vec::new()
    }
    fn destroy(&mut self);
}

#[cfg(windows)]
mod platform {
    use super::{PointerEvent, PointerSample, ScreenRect, WindowBackend};
    use crate::error::WindowCreationError;
    use crate::surface::render::TRANSPARENCY_COLORKEY;
    use once_cell::sync::Lazy;
    use std::mem;
    use std::ptr;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::{Mutex, Once};
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{COLORREF, HANDLE, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
    use windows::Win32::Graphics::Gdi::{
        BeginPaint, BitBlt, CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject,
        EndPaint, InvalidateRect, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
        DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ, PAINTSTRUCT, SRCCOPY,
    };
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
    use windows::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DefWindowProcW, DestroyWindow, GetWindowLongPtrW, LoadCursorW,
        RegisterClassW, SetLayeredWindowAttributes, SetWindowLongPtrW, SetWindowPos, ShowWindow,
        GWLP_USERDATA, GWL_EXSTYLE, HMENU, HWND_TOPMOST, IDC_CROSS, LWA_COLORKEY, MA_NOACTIVATE,
        SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_HIDE,
        SW_SHOWNOACTIVATE, WINDOW_EX_STYLE, WINDOW_STYLE, WM_ERASEBKGND, WM_LBUTTONDOWN,
        WM_LBUTTONUP, WM_MOUSEACTIVATE, WM_MOUSEMOVE, WM_PAINT, WNDCLASSW, WS_EX_LAYERED,
        WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
    };

    static POINTER_SENDER: Lazy<Mutex<Option<Sender<PointerSample>>>> =
        Lazy::new(|| Mutex::new(None));

    /// Topmost, layered, hidden from the task switcher, never activated.
    pub fn compose_overlay_window_ex_style() -> WINDOW_EX_STYLE {
        WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE
    }

    pub fn click_through_ex_style(current: WINDOW_EX_STYLE, ignore: bool) -> WINDOW_EX_STYLE {
        if ignore {
            current | WS_EX_LAYERED | WS_EX_TRANSPARENT
        } else {
            WINDOW_EX_STYLE(current.0 & !WS_EX_TRANSPARENT.0)
        }
    }

    fn colorkey() -> COLORREF {
        COLORREF(
            (TRANSPARENCY_COLORKEY.r as u32)
                | ((TRANSPARENCY_COLORKEY.g as u32) << 8)
                | ((TRANSPARENCY_COLORKEY.b as u32) << 16),
        )
    }

    fn widestring(value: &str) -> Vec<u16> {
        use std::os::windows::ffi::OsStrExt;
        std::ffi::OsStr::new(value)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect()
    }

    unsafe extern "system" fn overlay_wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_ERASEBKGND => LRESULT(1),
            WM_MOUSEACTIVATE => LRESULT(MA_NOACTIVATE as isize),
            WM_PAINT => {
                let mut ps = PAINTSTRUCT::default();
                let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
                if !hdc.0.is_null() {
                    let mem_dc = HDC(unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut _);
                    if !mem_dc.0.is_null() {
                        let _ = unsafe {
                            BitBlt(
                                hdc,
                                ps.rcPaint.left,
                                ps.rcPaint.top,
                                ps.rcPaint.right - ps.rcPaint.left,
                                ps.rcPaint.bottom - ps.rcPaint.top,
                                mem_dc,
                                ps.rcPaint.left,
                                ps.rcPaint.top,
                                SRCCOPY,
                            )
                        };
                    }
                }
                unsafe {
                    let _ = EndPaint(hwnd, &ps);
                }
                LRESULT(0)
            }
            WM_LBUTTONDOWN | WM_MOUSEMOVE | WM_LBUTTONUP => {
                if msg == WM_LBUTTONDOWN {
                    let _ = unsafe { SetCapture(hwnd) };
                } else if msg == WM_LBUTTONUP {
                    let _ = unsafe { ReleaseCapture() };
                }

                let x = (lparam.0 & 0xffff) as i16 as i32;
                let y = ((lparam.0 >> 16) & 0xffff) as i16 as i32;
                let event = match msg {
                    WM_LBUTTONDOWN => PointerEvent::Down,
                    WM_LBUTTONUP => PointerEvent::Up,
                    _ => PointerEvent::Move,
                };
                if let Ok(guard) = POINTER_SENDER.lock() {
                    if let Some(tx) = guard.as_ref() {
                        let _ = tx.send(PointerSample {
                            point: (x, y),
                            event,
                        });
                    }
                }
                LRESULT(0)
            }
            _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        }
    }

    #[derive(Debug)]
    pub struct NativeWindow {
        hwnd: HWND,
        mem_dc: HDC,
        dib: HBITMAP,
        old_bitmap: HGDIOBJ,
        bits: *mut u8,
        size: (u32, u32),
        pointer_rx: Option<Receiver<PointerSample>>,
    }

    impl Default for NativeWindow {
        fn default() -> Self {
            Self {
                hwnd: HWND::default(),
                mem_dc: HDC::default(),
                dib: HBITMAP::default(),
                old_bitmap: HGDIOBJ::default(),
                bits: ptr::null_mut(),
                size: (0, 0),
                pointer_rx: None,
            }
        }
    }

    impl NativeWindow {
        fn is_alive(&self) -> bool {
            !self.hwnd.0.is_null()
        }

        fn create_backing_bitmap(&mut self, rect: ScreenRect) -> Result<(), WindowCreationError> {
            let mem_dc = unsafe { CreateCompatibleDC(HDC::default()) };
            if mem_dc.0.is_null() {
                return Err(WindowCreationError::new("CreateCompatibleDC failed"));
            }
            self.mem_dc = mem_dc;

            let mut bmi = BITMAPINFO::default();
            bmi.bmiHeader = BITMAPINFOHEADER {
                biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: rect.width,
                biHeight: -rect.height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            };

            let mut bits: *mut core::ffi::c_void = ptr::null_mut();
            let dib = unsafe {
                CreateDIBSection(mem_dc, &bmi, DIB_RGB_COLORS, &mut bits, HANDLE::default(), 0)
            }
            .map_err(|err| WindowCreationError::new(format!("CreateDIBSection failed: {err}")))?;
            if bits.is_null() {
                unsafe {
                    let _ = DeleteObject(dib);
                }
                return Err(WindowCreationError::new("DIB section has no pixel storage"));
            }

            self.dib = dib;
            self.old_bitmap = unsafe { SelectObject(mem_dc, dib) };
            self.bits = bits as *mut u8;
            self.size = (rect.width as u32, rect.height as u32);
            unsafe {
                let _ = SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, mem_dc.0 as isize);
            }
            Ok(())
        }
    }

    impl WindowBackend for NativeWindow {
        fn create(&mut self, rect: ScreenRect) -> Result<(), WindowCreationError> {
            if self.is_alive() {
                return Ok(());
            }
            if rect.is_empty() {
                return Err(WindowCreationError::new(format!(
                    "overlay rectangle {rect:?} has no area"
                )));
            }

            static REGISTER_CLASS: Once = Once::new();
            let class_name = widestring("InkOverlayWindow");
            let hinstance: HINSTANCE = unsafe { GetModuleHandleW(PCWSTR::null()) }
                .map_err(|err| WindowCreationError::new(format!("GetModuleHandleW: {err}")))?
                .into();

            REGISTER_CLASS.call_once(|| unsafe {
                let wc = WNDCLASSW {
                    hInstance: hinstance,
                    lpszClassName: PCWSTR(class_name.as_ptr()),
                    lpfnWndProc: Some(overlay_wndproc),
                    hCursor: LoadCursorW(HINSTANCE::default(), IDC_CROSS).unwrap_or_default(),
                    ..Default::default()
                };
                let _ = RegisterClassW(&wc);
            });

            let title = widestring("Ink Overlay");
            self.hwnd = unsafe {
                CreateWindowExW(
                    compose_overlay_window_ex_style(),
                    PCWSTR(class_name.as_ptr()),
                    PCWSTR(title.as_ptr()),
                    WINDOW_STYLE(WS_POPUP.0),
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    HWND::default(),
                    HMENU::default(),
                    hinstance,
                    None,
                )
            }
            .map_err(|err| WindowCreationError::new(format!("CreateWindowExW: {err}")))?;

            let setup = unsafe { SetLayeredWindowAttributes(self.hwnd, colorkey(), 0, LWA_COLORKEY) }
                .map_err(|err| WindowCreationError::new(format!("SetLayeredWindowAttributes: {err}")))
                .and_then(|()| self.create_backing_bitmap(rect));
            if let Err(err) = setup {
                self.destroy();
                return Err(err);
            }

            let (pointer_tx, pointer_rx) = channel::<PointerSample>();
            if let Ok(mut guard) = POINTER_SENDER.lock() {
                *guard = Some(pointer_tx);
            }
            self.pointer_rx = Some(pointer_rx);
            Ok(())
        }

        fn show_inactive(&mut self) {
            if !self.is_alive() {
                return;
            }
            unsafe {
                let _ = ShowWindow(self.hwnd, SW_SHOWNOACTIVATE);
                let _ = SetWindowPos(
                    self.hwnd,
                    HWND_TOPMOST,
                    0,
                    0,
                    0,
                    0,
                    SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
                );
            }
        }

        fn hide(&mut self) {
            if !self.is_alive() {
                return;
            }
            unsafe {
                let _ = ShowWindow(self.hwnd, SW_HIDE);
            }
        }

        fn set_ignore_mouse_events(&mut self, ignore: bool) {
            if !self.is_alive() {
                return;
            }
            unsafe {
                let current = WINDOW_EX_STYLE(GetWindowLongPtrW(self.hwnd, GWL_EXSTYLE) as u32);
                let next = click_through_ex_style(current, ignore);
                let _ = SetWindowLongPtrW(self.hwnd, GWL_EXSTYLE, next.0 as isize);
                let _ = SetWindowPos(
                    self.hwnd,
                    HWND::default(),
                    0,
                    0,
                    0,
                    0,
                    SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE | SWP_FRAMECHANGED,
                );
            }
        }

        fn with_bitmap_mut(&mut self, f: &mut dyn FnMut(&mut [u8], u32, u32)) -> bool {
            let (width, height) = self.size;
            if self.bits.is_null() || width == 0 || height == 0 {
                return false;
            }
            let len = (width as usize)
                .saturating_mul(height as usize)
                .saturating_mul(4);
            let pixels = unsafe { std::slice::from_raw_parts_mut(self.bits, len) };
            f(pixels, width, height);
            true
        }

        fn request_paint(&mut self) {
            if !self.is_alive() {
                return;
            }
            unsafe {
                let _ = InvalidateRect(self.hwnd, None, false);
            }
        }

        fn drain_pointer_events(&mut self) -> Vec<PointerSample> {
            match &self.pointer_rx {
                Some(rx) => rx.try_iter().collect(),
                None => Vec::new(),
            }
        }

        fn destroy(&mut self) {
            unsafe {
                if !self.mem_dc.0.is_null() && !self.old_bitmap.0.is_null() {
                    let _ = SelectObject(self.mem_dc, self.old_bitmap);
                    self.old_bitmap = HGDIOBJ::default();
                }
                if !self.dib.0.is_null() {
                    let _ = DeleteObject(self.dib);
                    self.dib = HBITMAP::default();
                }
                if !self.mem_dc.0.is_null() {
                    let _ = DeleteDC(self.mem_dc);
                    self.mem_dc = HDC::default();
                }
                if self.is_alive() {
                    let _ = DestroyWindow(self.hwnd);
                    self.hwnd = HWND::default();
                }
            }
            if let Ok(mut guard) = POINTER_SENDER.lock() {
                *guard = None;
            }
            self.pointer_rx = None;
            self.bits = ptr::null_mut();
            self.size = (0, 0);
        }
    }

    impl Drop for NativeWindow {
        fn drop(&mut self) {
            self.destroy();
        }
    }

}

#[cfg(windows)]
pub use platform::NativeWindow;

#[cfg(not(windows))]
#[derive(Debug, Default)]
pub struct NativeWindow;

#[cfg(not(windows))]
impl WindowBackend for NativeWindow {
    fn create(&mut self, _rect: ScreenRect) -> Result<(), WindowCreationError> {
        Err(WindowCreationError::new(
            "no display surface available on this platform",
        ))
    }

    fn show_inactive(&mut self) {}

    fn hide(&mut self) {}

    fn set_ignore_mouse_events(&mut self, _ignore: bool) {}

    fn with_bitmap_mut(&mut self, _f: &mut dyn FnMut(&mut [u8], u32, u32)) -> bool {
        false
    }

    fn request_paint(&mut self) {}

    fn destroy(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rect_is_fixed_oversized_area() {
        let rect = ScreenRect::default();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (0, 0, 3840, 2160));
        assert!(!rect.is_empty());
    }

    #[test]
    fn contains_is_half_open() {
        let rect = ScreenRect {
            x: -10,
            y: 0,
            width: 20,
            height: 10,
        };
        assert!(rect.contains((-10, 0)));
        assert!(rect.contains((9, 9)));
        assert!(!rect.contains((10, 5)));
        assert!(!rect.contains((0, 10)));
    }
}
