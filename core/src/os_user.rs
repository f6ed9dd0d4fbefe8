//! Current-user lookups backed by libc.

use std::ffi::CStr;
use std::path::PathBuf;

/// Login name of the current user.
///
/// Tries `getlogin(3)` first; it fails for processes without a controlling
/// terminal (cron, daemons), in which case the password entry of the
/// effective uid is used.
pub fn login_name() -> Option<String> {
    let ptr = unsafe { libc::getlogin() };
    if !ptr.is_null() {
        let name = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        if !name.is_empty() {
            return Some(name);
        }
    }
    passwd_entry().map(|(name, _)| name)
}

/// `$HOME`, else the home directory from the password database.
pub fn home_dir() -> Option<PathBuf> {
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => passwd_entry().map(|(_, dir)| dir),
    }
}

fn passwd_entry() -> Option<(String, PathBuf)> {
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut buf = vec![0 as libc::c_char; 4096];
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    let rc = unsafe {
        libc::getpwuid_r(
            libc::geteuid(),
            &mut pwd,
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 || result.is_null() || pwd.pw_name.is_null() || pwd.pw_dir.is_null() {
        return None;
    }

    let name = unsafe { CStr::from_ptr(pwd.pw_name) }.to_string_lossy().into_owned();
    let dir = unsafe { CStr::from_ptr(pwd.pw_dir) }.to_string_lossy().into_owned();
    Some((name, PathBuf::from(dir)))
}
