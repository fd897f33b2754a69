use std::ffi::OsString;
use std::io;
use std::mem;
use std::os::windows::ffi::OsStringExt;
use std::ptr;

use tracing::{debug, info, warn};
use winapi::shared::basetsd::SIZE_T;
use winapi::shared::minwindef::{BOOL, DWORD, FALSE, LPARAM, LPCVOID, LPVOID, TRUE};
use winapi::shared::windef::HWND;
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::memoryapi::{ReadProcessMemory, WriteProcessMemory};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW, TH32CS_SNAPPROCESS,
};
use winapi::um::winnt::{
    HANDLE, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION, PROCESS_VM_READ, PROCESS_VM_WRITE,
};
use winapi::um::winuser::{
    EnumWindows, GetWindowThreadProcessId, IsWindowVisible, KEYEVENTF_KEYUP, SW_SHOW,
    SetActiveWindow, SetForegroundWindow, ShowWindow, keybd_event,
};

use super::{ProcessInfo, matches_name};
use crate::error::MemoryError;
use crate::input::{InputInjector, VirtualKey};
use crate::memory::ProcessMemory;

/// Open handle to the game process with read/write access.
#[derive(Debug)]
pub struct GameProcess {
    pid: u32,
    handle: HANDLE,
}

// The handle is only used through ReadProcessMemory/WriteProcessMemory,
// which are safe to call from any thread.
unsafe impl Send for GameProcess {}

impl GameProcess {
    pub fn attach(pid: u32) -> Result<Self, MemoryError> {
        let access =
            PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION | PROCESS_QUERY_INFORMATION;
        let handle = unsafe { OpenProcess(access, FALSE, pid) };
        if handle.is_null() {
            return Err(MemoryError::Attach {
                pid,
                source: io::Error::last_os_error(),
            });
        }
        info!("Attached to process {}", pid);
        Ok(Self { pid, handle })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for GameProcess {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.handle);
        }
        debug!("Closed handle to process {}", self.pid);
    }
}

impl ProcessMemory for GameProcess {
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>, MemoryError> {
        let mut buffer = vec![0u8; len];
        let mut read: SIZE_T = 0;
        let ok = unsafe {
            ReadProcessMemory(
                self.handle,
                address as usize as LPCVOID,
                buffer.as_mut_ptr() as LPVOID,
                len as SIZE_T,
                &mut read,
            )
        };
        if ok == 0 {
            return Err(MemoryError::Read {
                address,
                len,
                source: io::Error::last_os_error(),
            });
        }
        buffer.truncate(read);
        Ok(buffer)
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<(), MemoryError> {
        let mut written: SIZE_T = 0;
        let ok = unsafe {
            WriteProcessMemory(
                self.handle,
                address as usize as LPVOID,
                bytes.as_ptr() as LPCVOID,
                bytes.len() as SIZE_T,
                &mut written,
            )
        };
        if ok == 0 || written != bytes.len() {
            return Err(MemoryError::Write {
                address,
                len: bytes.len(),
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }
}

/// Injects key events into the foreground window.
#[derive(Debug, Default)]
pub struct KeyboardInjector;

impl KeyboardInjector {
    pub fn new() -> Self {
        Self
    }
}

impl InputInjector for KeyboardInjector {
    fn key_down(&mut self, key: VirtualKey) {
        unsafe { keybd_event(key.0, 0, 0, 0) };
    }

    fn key_up(&mut self, key: VirtualKey) {
        unsafe { keybd_event(key.0, 0, KEYEVENTF_KEYUP, 0) };
    }
}

/// Lists running processes whose executable name equals `name`.
pub fn find_processes(name: &str) -> Result<Vec<ProcessInfo>, MemoryError> {
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
    if snapshot == INVALID_HANDLE_VALUE {
        return Err(MemoryError::Attach {
            pid: 0,
            source: io::Error::last_os_error(),
        });
    }

    let mut processes = Vec::new();
    unsafe {
        let mut entry: PROCESSENTRY32W = mem::zeroed();
        entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as DWORD;

        if Process32FirstW(snapshot, &mut entry) != 0 {
            loop {
                let exe = exe_name(&entry.szExeFile);
                if matches_name(&exe, name) {
                    processes.push(ProcessInfo {
                        pid: entry.th32ProcessID,
                        name: exe,
                    });
                }
                if Process32NextW(snapshot, &mut entry) == 0 {
                    break;
                }
            }
        }
        CloseHandle(snapshot);
    }

    debug!("Found {} process(es) named {}", processes.len(), name);
    Ok(processes)
}

fn exe_name(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    OsString::from_wide(&raw[..len])
        .to_string_lossy()
        .into_owned()
}

struct WindowSearch {
    pid: DWORD,
    window: HWND,
}

unsafe extern "system" fn find_window_of(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let search = unsafe { &mut *(lparam as *mut WindowSearch) };
    let mut owner: DWORD = 0;
    unsafe { GetWindowThreadProcessId(hwnd, &mut owner) };
    if owner == search.pid && unsafe { IsWindowVisible(hwnd) } != 0 {
        search.window = hwnd;
        return FALSE;
    }
    TRUE
}

/// Brings the first visible top-level window of `pid` to the foreground.
///
/// Returns false when no such window exists or Windows refuses the switch.
pub fn focus_window(pid: u32) -> bool {
    let mut search = WindowSearch {
        pid,
        window: ptr::null_mut(),
    };
    unsafe {
        EnumWindows(
            Some(find_window_of),
            &mut search as *mut WindowSearch as LPARAM,
        );
    }

    if search.window.is_null() {
        warn!("No visible window found for process {}", pid);
        return false;
    }

    let focused = unsafe {
        ShowWindow(search.window, SW_SHOW);
        let focused = SetForegroundWindow(search.window) != 0;
        SetActiveWindow(search.window);
        focused
    };
    if focused {
        info!("Focused game window of process {}", pid);
    } else {
        warn!("Could not bring process {} to the foreground", pid);
    }
    focused
}
