//! Process existence checks.

/// Whether a process with `pid` is alive (or an unreaped zombie).
///
/// # Platform behavior
/// - **Unix**: signal 0 via `kill(2)`; `EPERM` still means the process exists
/// - **Other**: always `false`
pub fn pid_exists(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal;
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        match signal::kill(Pid::from_raw(raw), None) {
            Ok(()) | Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        false
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_own_pid_exists() {
        assert!(pid_exists(std::process::id()));
    }

    #[tokio::test]
    async fn test_reaped_child_is_gone() {
        let mut child = tokio::process::Command::new("true").spawn().unwrap();
        let pid = child.id().unwrap();
        child.wait().await.unwrap();
        assert!(!pid_exists(pid));
    }
}
