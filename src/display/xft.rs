//! Xlib + Xft backend drawing into a borderless window below everything else
//!
//! The window is override-redirect, so window managers leave its position and
//! size alone, and is restacked to the bottom whenever it is placed. Its
//! background is a copy of the matching region of the root pixmap
//! (`_XROOTPMAP_ID`), which makes it look transparent on the desktop.
//!
//! The loop talks in screen coordinates; this module translates them to and
//! from window-local ones.
use std::{
    ffi::CString,
    mem::MaybeUninit,
    os::{
        fd::{BorrowedFd, RawFd},
        raw::{c_int, c_uchar, c_uint, c_ulong},
    },
    ptr::{self, NonNull},
    time::Duration,
};

use rustix::event::{poll, PollFd, PollFlags};
use rustix::io::Errno;
use tracing::{debug, trace, warn};
use x11::{
    xft::{
        XftColor, XftColorAllocName, XftColorFree, XftDraw, XftDrawCreate, XftDrawDestroy,
        XftDrawStringUtf8, XftFont, XftFontClose, XftFontOpenName, XftTextExtentsUtf8,
    },
    xlib::{
        self, Atom, Colormap, Pixmap, Visual, Window, XClearArea, XClearWindow, XCloseDisplay,
        XConfigureWindow, XConnectionNumber, XCopyArea, XCreatePixmap, XCreateWindow,
        XDefaultColormap, XDefaultDepth, XDefaultGC, XDefaultScreen, XDefaultVisual,
        XDestroyWindow, XDisplayHeight, XDisplayWidth, XEvent, XFlush, XFree, XFreePixmap,
        XGetWindowProperty, XInternAtom, XMapWindow, XNextEvent, XOpenDisplay, XPending,
        XQLength, XRootWindow, XSetWindowAttributes, XSetWindowBackgroundPixmap, XWindowChanges,
    },
    xrender::XGlyphInfo,
};

use super::{Backend, DisplayEvent, FontMetrics, Wakeup};
use crate::error::{ClockError, Result};
use crate::geometry::Rect;

/// Turn a pointer returned by Xlib/Xft into `Err(err())` when it is null
fn non_null<T>(ptr: *mut T, err: impl FnOnce() -> ClockError) -> Result<NonNull<T>> {
    NonNull::new(ptr).ok_or_else(err)
}

/// The display connection; closed last
struct Connection(NonNull<xlib::Display>);

impl Drop for Connection {
    fn drop(&mut self) {
        unsafe {
            XCloseDisplay(self.0.as_ptr());
        }
        debug!("Closed display");
    }
}

struct Font {
    dpy: *mut xlib::Display,
    font: NonNull<XftFont>,
}

impl Drop for Font {
    fn drop(&mut self) {
        unsafe { XftFontClose(self.dpy, self.font.as_ptr()) }
    }
}

struct Color {
    dpy: *mut xlib::Display,
    visual: *mut Visual,
    colormap: Colormap,
    color: XftColor,
}

impl Drop for Color {
    fn drop(&mut self) {
        unsafe { XftColorFree(self.dpy, self.visual, self.colormap, &mut self.color) }
    }
}

struct OverlayWindow {
    dpy: *mut xlib::Display,
    id: Window,
}

impl Drop for OverlayWindow {
    fn drop(&mut self) {
        unsafe {
            XDestroyWindow(self.dpy, self.id);
        }
    }
}

struct Draw(NonNull<XftDraw>);

impl Drop for Draw {
    fn drop(&mut self) {
        unsafe { XftDrawDestroy(self.0.as_ptr()) }
    }
}

/// Window text renderer backed by Xft
///
/// Every X resource is owned by a field that frees it on drop. Fields drop in
/// declaration order, so the connection goes last, and a failed
/// [`XftBackend::open`] releases whatever it had already acquired.
pub struct XftBackend {
    draw: Draw,
    color: Color,
    font: Font,
    window: OverlayWindow,
    conn: Connection,
    fd: RawFd,
    screen: c_int,
    root: Window,
    depth: c_int,
    screen_size: (u32, u32),
    /// Screen position of the window's top-left corner
    origin: (i32, i32),
    mapped: bool,
}

impl XftBackend {
    /// Connect to the default display, load `font` in `color` and create the
    /// (still unmapped) clock window
    pub fn open(font: &str, color: &str) -> Result<Self> {
        let c_font = CString::new(font)?;
        let c_color = CString::new(color)?;

        let conn = Connection(non_null(unsafe { XOpenDisplay(ptr::null()) }, || {
            ClockError::DisplayOpen
        })?);
        let dpy = conn.0.as_ptr();

        let (screen, root, visual, colormap, depth) = unsafe {
            let screen = XDefaultScreen(dpy);
            (
                screen,
                XRootWindow(dpy, screen),
                XDefaultVisual(dpy, screen),
                XDefaultColormap(dpy, screen),
                XDefaultDepth(dpy, screen),
            )
        };
        let screen_size = unsafe {
            (
                XDisplayWidth(dpy, screen).max(0) as u32,
                XDisplayHeight(dpy, screen).max(0) as u32,
            )
        };

        let font_ptr = unsafe { XftFontOpenName(dpy, screen, c_font.as_ptr()) };
        let xft_font = Font {
            dpy,
            font: non_null(font_ptr, || ClockError::FontOpen(font.to_string()))?,
        };

        let xft_color = unsafe {
            let mut xft_color = MaybeUninit::<XftColor>::uninit();
            if XftColorAllocName(dpy, visual, colormap, c_color.as_ptr(), xft_color.as_mut_ptr())
                == 0
            {
                return Err(ClockError::ColorAlloc(color.to_string()));
            }
            Color {
                dpy,
                visual,
                colormap,
                color: xft_color.assume_init(),
            }
        };

        let window = unsafe {
            let mut attrs: XSetWindowAttributes = std::mem::zeroed();
            attrs.override_redirect = xlib::True;
            attrs.event_mask = xlib::ExposureMask;
            attrs.background_pixmap = xlib::ParentRelative as Pixmap;

            OverlayWindow {
                dpy,
                id: XCreateWindow(
                    dpy,
                    root,
                    0,
                    0,
                    1,
                    1,
                    0,
                    depth,
                    xlib::InputOutput as c_uint,
                    visual,
                    xlib::CWOverrideRedirect | xlib::CWEventMask | xlib::CWBackPixmap,
                    &mut attrs,
                ),
            }
        };

        let draw_ptr = unsafe { XftDrawCreate(dpy, window.id, visual, colormap) };
        let draw = Draw(non_null(draw_ptr, || ClockError::DrawCreate)?);

        debug!(
            font,
            color,
            window = window.id,
            width = screen_size.0,
            height = screen_size.1,
            "Opened display"
        );

        Ok(Self {
            draw,
            color: xft_color,
            font: xft_font,
            window,
            fd: unsafe { XConnectionNumber(dpy) },
            conn,
            screen,
            root,
            depth,
            screen_size,
            origin: (0, 0),
            mapped: false,
        })
    }

    fn dpy(&self) -> *mut xlib::Display {
        self.conn.0.as_ptr()
    }

    /// Pixmap the desktop painted its wallpaper into, if it advertises one
    fn root_pixmap(&self) -> Option<Pixmap> {
        let name = CString::new("_XROOTPMAP_ID").ok()?;

        unsafe {
            let atom: Atom = XInternAtom(self.dpy(), name.as_ptr(), xlib::True);
            if atom == 0 {
                return None;
            }

            let mut actual_type: Atom = 0;
            let mut format: c_int = 0;
            let mut nitems: c_ulong = 0;
            let mut bytes_after: c_ulong = 0;
            let mut prop: *mut c_uchar = ptr::null_mut();

            let res = XGetWindowProperty(
                self.dpy(),
                self.root,
                atom,
                0,
                1,
                xlib::False,
                xlib::XA_PIXMAP,
                &mut actual_type,
                &mut format,
                &mut nitems,
                &mut bytes_after,
                &mut prop,
            );
            if res != xlib::Success as c_int || prop.is_null() {
                return None;
            }

            let pixmap = if nitems > 0 && format == 32 {
                Some(*(prop as *const Pixmap))
            } else {
                None
            };
            XFree(prop.cast());
            pixmap.filter(|&p| p != 0)
        }
    }

    /// Give the window a copy of the wallpaper underneath `area`
    ///
    /// Without a root pixmap the window falls back to its parent's
    /// background.
    fn set_background(&mut self, area: Rect) {
        let dpy = self.dpy();

        let Some(root_pixmap) = self.root_pixmap() else {
            warn!("No root background pixmap, using the root window's background");
            unsafe {
                XSetWindowBackgroundPixmap(dpy, self.window.id, xlib::ParentRelative as Pixmap);
            }
            return;
        };

        unsafe {
            let background = XCreatePixmap(dpy, self.root, area.w, area.h, self.depth as c_uint);
            XCopyArea(
                dpy,
                root_pixmap,
                background,
                XDefaultGC(dpy, self.screen),
                area.x,
                area.y,
                area.w,
                area.h,
                0,
                0,
            );
            XSetWindowBackgroundPixmap(dpy, self.window.id, background);
            // The window keeps its own reference
            XFreePixmap(dpy, background);
        }
    }

    fn to_local(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.origin.0, y - self.origin.1)
    }
}

impl Backend for XftBackend {
    fn screen_size(&self) -> (u32, u32) {
        self.screen_size
    }

    fn font_metrics(&self) -> FontMetrics {
        let font = unsafe { self.font.font.as_ref() };
        FontMetrics {
            ascent: font.ascent,
            descent: font.descent,
        }
    }

    fn text_advance(&mut self, text: &str) -> Result<u32> {
        let mut extents = MaybeUninit::<XGlyphInfo>::uninit();

        let extents = unsafe {
            XftTextExtentsUtf8(
                self.dpy(),
                self.font.font.as_ptr(),
                text.as_ptr(),
                text.len() as c_int,
                extents.as_mut_ptr(),
            );
            extents.assume_init()
        };

        Ok(extents.xOff.max(0) as u32)
    }

    fn next_event(&mut self) -> Result<Option<DisplayEvent>> {
        let event = unsafe {
            if XPending(self.dpy()) == 0 {
                return Ok(None);
            }

            let mut event = MaybeUninit::<XEvent>::uninit();
            XNextEvent(self.dpy(), event.as_mut_ptr());
            event.assume_init()
        };

        if event.get_type() != xlib::Expose {
            return Ok(Some(DisplayEvent::Other));
        }

        let e = unsafe { event.expose };
        Ok(Some(DisplayEvent::Expose(Rect::new(
            e.x + self.origin.0,
            e.y + self.origin.1,
            e.width.max(0) as u32,
            e.height.max(0) as u32,
        ))))
    }

    fn place(&mut self, area: Rect) -> Result<()> {
        // X rejects zero-sized windows
        let area = Rect::new(area.x, area.y, area.w.max(1), area.h.max(1));

        let mut changes = XWindowChanges {
            x: area.x,
            y: area.y,
            width: area.w as c_int,
            height: area.h as c_int,
            border_width: 0,
            sibling: 0,
            stack_mode: xlib::Below,
        };
        let mask = xlib::CWX | xlib::CWY | xlib::CWWidth | xlib::CWHeight | xlib::CWStackMode;

        unsafe {
            XConfigureWindow(self.dpy(), self.window.id, mask as c_uint, &mut changes);
        }
        self.origin = (area.x, area.y);
        self.set_background(area);

        unsafe {
            if !self.mapped {
                XMapWindow(self.dpy(), self.window.id);
                self.mapped = true;
            }
            XClearWindow(self.dpy(), self.window.id);
        }

        debug!(?area, "Placed clock window");
        Ok(())
    }

    fn clear(&mut self, area: Rect) -> Result<()> {
        // A zero width or height would clear to the edge of the window
        if area.w == 0 || area.h == 0 {
            return Ok(());
        }

        let (x, y) = self.to_local(area.x, area.y);
        unsafe {
            XClearArea(self.dpy(), self.window.id, x, y, area.w, area.h, xlib::False);
        }

        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: i32, baseline: i32) -> Result<()> {
        let (x, baseline) = self.to_local(x, baseline);

        unsafe {
            XftDrawStringUtf8(
                self.draw.0.as_ptr(),
                &self.color.color,
                self.font.font.as_ptr(),
                x,
                baseline,
                text.as_ptr(),
                text.len() as c_int,
            );
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        unsafe {
            XFlush(self.dpy());
        }

        Ok(())
    }

    fn wait(&mut self, timeout: Duration) -> Result<Wakeup> {
        // Xlib may have pulled events off the socket while flushing
        if unsafe { XQLength(self.dpy()) } > 0 {
            return Ok(Wakeup::Readable);
        }

        // Round up so a sub-millisecond remainder does not turn into a spin
        let millis = timeout.as_nanos().div_ceil(1_000_000).min(i32::MAX as u128) as i32;
        let fd = unsafe { BorrowedFd::borrow_raw(self.fd) };
        let mut fds = [PollFd::from_borrowed_fd(fd, PollFlags::IN)];

        match poll(&mut fds, millis) {
            Ok(0) => Ok(Wakeup::Timeout),
            Ok(_) => Ok(Wakeup::Readable),
            Err(e) if e == Errno::INTR => {
                trace!("Wait interrupted by signal");
                Ok(Wakeup::Interrupted)
            }
            Err(e) => Err(ClockError::Wait(e.into())),
        }
    }
}
