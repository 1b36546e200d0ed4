//! The injectable host service `std.io`/`std.fs` builtins delegate to
//! (spec §4.5, "effectful builtins ... delegate to host services"), mirrored
//! on the reference compiler's `PrintHandlerImpl` enum-dispatch (adapted
//! from `Arc`/`Mutex` to `Rc`/`RefCell`, matching Kira's single-threaded
//! evaluation model).

use std::cell::RefCell;
use std::fs;
use std::io::Write as _;
use std::rc::Rc;

/// Every fallible `std.fs` operation reports failure as a plain message;
/// the stdlib wraps it in `Err(string)` rather than raising (spec §4.5:
/// "Failures are returned as `Err(string)` ... never raised").
pub type HostResult<T> = Result<T, String>;

/// Host services the interpreter never performs itself: console output,
/// console input, and the filesystem. Swappable so tests can assert on
/// captured output instead of touching the real console/filesystem.
pub trait Host {
    fn print(&self, text: &str);
    fn println(&self, text: &str);
    fn eprintln(&self, text: &str);
    /// `None` at EOF.
    fn read_line(&self) -> Option<String>;

    fn read_file(&self, path: &str) -> HostResult<String>;
    fn write_file(&self, path: &str, contents: &str) -> HostResult<()>;
    fn append_file(&self, path: &str, contents: &str) -> HostResult<()>;
    fn exists(&self, path: &str) -> bool;
    fn remove(&self, path: &str) -> HostResult<()>;
    fn read_dir(&self, path: &str) -> HostResult<Vec<String>>;
    fn is_file(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;
    fn create_dir(&self, path: &str) -> HostResult<()>;
}

/// The default host: real stdio, real filesystem.
#[derive(Default)]
pub struct NativeHost;

impl Host for NativeHost {
    fn print(&self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn println(&self, text: &str) {
        println!("{text}");
    }

    fn eprintln(&self, text: &str) {
        eprintln!("{text}");
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
            Err(_) => None,
        }
    }

    fn read_file(&self, path: &str) -> HostResult<String> {
        fs::read_to_string(path).map_err(|e| e.to_string())
    }

    fn write_file(&self, path: &str, contents: &str) -> HostResult<()> {
        fs::write(path, contents).map_err(|e| e.to_string())
    }

    fn append_file(&self, path: &str, contents: &str) -> HostResult<()> {
        use std::fs::OpenOptions;
        let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(|e| e.to_string())?;
        file.write_all(contents.as_bytes()).map_err(|e| e.to_string())
    }

    fn exists(&self, path: &str) -> bool {
        std::path::Path::new(path).exists()
    }

    fn remove(&self, path: &str) -> HostResult<()> {
        let p = std::path::Path::new(path);
        if p.is_dir() { fs::remove_dir_all(p) } else { fs::remove_file(p) }.map_err(|e| e.to_string())
    }

    fn read_dir(&self, path: &str) -> HostResult<Vec<String>> {
        let entries = fs::read_dir(path).map_err(|e| e.to_string())?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| e.to_string())?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn is_file(&self, path: &str) -> bool {
        std::path::Path::new(path).is_file()
    }

    fn is_dir(&self, path: &str) -> bool {
        std::path::Path::new(path).is_dir()
    }

    fn create_dir(&self, path: &str) -> HostResult<()> {
        fs::create_dir_all(path).map_err(|e| e.to_string())
    }
}

/// A host for tests: captures `print`/`println`/`eprintln` output in memory
/// and serves `std.fs` from an in-memory file map instead of the real
/// filesystem.
#[derive(Default)]
pub struct BufferHost {
    pub stdout: RefCell<String>,
    pub stderr: RefCell<String>,
    pub stdin: RefCell<Vec<String>>,
    pub files: RefCell<rustc_hash::FxHashMap<String, String>>,
}

impl BufferHost {
    pub fn new() -> Self {
        BufferHost::default()
    }

    /// Queue lines `read_line` will hand out in order.
    pub fn feed_line(&self, line: impl Into<String>) {
        self.stdin.borrow_mut().push(line.into());
    }
}

impl Host for BufferHost {
    fn print(&self, text: &str) {
        self.stdout.borrow_mut().push_str(text);
    }

    fn println(&self, text: &str) {
        let mut out = self.stdout.borrow_mut();
        out.push_str(text);
        out.push('\n');
    }

    fn eprintln(&self, text: &str) {
        let mut out = self.stderr.borrow_mut();
        out.push_str(text);
        out.push('\n');
    }

    fn read_line(&self) -> Option<String> {
        let mut lines = self.stdin.borrow_mut();
        if lines.is_empty() { None } else { Some(lines.remove(0)) }
    }

    fn read_file(&self, path: &str) -> HostResult<String> {
        self.files.borrow().get(path).cloned().ok_or_else(|| format!("no such file: {path}"))
    }

    fn write_file(&self, path: &str, contents: &str) -> HostResult<()> {
        self.files.borrow_mut().insert(path.to_string(), contents.to_string());
        Ok(())
    }

    fn append_file(&self, path: &str, contents: &str) -> HostResult<()> {
        self.files.borrow_mut().entry(path.to_string()).or_default().push_str(contents);
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn remove(&self, path: &str) -> HostResult<()> {
        self.files.borrow_mut().remove(path).map(|_| ()).ok_or_else(|| format!("no such file: {path}"))
    }

    fn read_dir(&self, path: &str) -> HostResult<Vec<String>> {
        let prefix = format!("{path}/");
        Ok(self.files.borrow().keys().filter_map(|k| k.strip_prefix(&prefix)).map(str::to_string).collect())
    }

    fn is_file(&self, path: &str) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        let prefix = format!("{path}/");
        self.files.borrow().keys().any(|k| k.starts_with(&prefix))
    }

    fn create_dir(&self, _path: &str) -> HostResult<()> {
        Ok(())
    }
}

pub type SharedHost = Rc<dyn Host>;

pub fn native_host() -> SharedHost {
    Rc::new(NativeHost)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn buffer_host_captures_println_with_newline() {
        let host = BufferHost::new();
        host.println("hello");
        assert_eq!(*host.stdout.borrow(), "hello\n");
    }

    #[test]
    fn buffer_host_read_line_drains_the_queue() {
        let host = BufferHost::new();
        host.feed_line("a");
        host.feed_line("b");
        assert_eq!(host.read_line(), Some("a".to_string()));
        assert_eq!(host.read_line(), Some("b".to_string()));
        assert_eq!(host.read_line(), None);
    }

    #[test]
    fn buffer_host_write_then_read_file_round_trips() {
        let host = BufferHost::new();
        host.write_file("a.txt", "hi").unwrap();
        assert_eq!(host.read_file("a.txt").unwrap(), "hi");
        assert!(host.exists("a.txt"));
    }

    #[test]
    fn buffer_host_append_file_extends_existing_contents() {
        let host = BufferHost::new();
        host.write_file("a.txt", "hi").unwrap();
        host.append_file("a.txt", "!").unwrap();
        assert_eq!(host.read_file("a.txt").unwrap(), "hi!");
    }

    #[test]
    fn buffer_host_remove_missing_file_is_an_error() {
        let host = BufferHost::new();
        assert!(host.remove("missing.txt").is_err());
    }
}
