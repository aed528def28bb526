//! Headless Chromium render engine.
//!
//! Each session gets its own scratch workspace (profile dir, markup file,
//! printed output). Settling is delegated to Chromium's virtual time budget:
//! the print process exits only after the page's network fetches, fonts and
//! timers have run. The child is spawned with `kill_on_drop`, so a timed-out
//! or cancelled wait terminates it.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::render::engine::{EngineError, PageSetup, RenderEngine, RenderSession};

/// Required when running inside containers without user namespaces.
const HARDENED_FLAGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--disable-gpu",
    "--no-first-run",
    "--no-zygote",
    "--hide-scrollbars",
    "--run-all-compositor-stages-before-draw",
    "--no-pdf-header-footer",
    "--window-size=1200,1600",
];

/// Virtual time Chromium grants the page to finish loading before printing.
const VIRTUAL_TIME_BUDGET_MS: u32 = 10_000;
const DOCUMENT_FILE: &str = "document.html";
const OUTPUT_FILE: &str = "output.pdf";
const PROFILE_DIR: &str = "profile";
/// Stderr is truncated to this many bytes in error messages.
const STDERR_TAIL: usize = 512;

pub struct ChromiumEngine {
    binary: PathBuf,
}

impl ChromiumEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn launch(&self) -> Result<Box<dyn RenderSession>, EngineError> {
        let binary = resolve_binary(&self.binary).ok_or_else(|| {
            EngineError::Launch(format!(
                "browser binary '{}' not found",
                self.binary.display()
            ))
        })?;

        let workspace = tempfile::Builder::new()
            .prefix("intake-chromium-")
            .tempdir()
            .map_err(|e| EngineError::Launch(format!("cannot create session workspace: {e}")))?;

        let session = ChromiumSession {
            id: Uuid::new_v4(),
            binary,
            workspace,
            document: None,
            printed: None,
        };
        info!(
            "Chromium session {} started in {}",
            session.id,
            session.workspace.path().display()
        );
        Ok(Box::new(session))
    }
}

struct ChromiumSession {
    id: Uuid,
    binary: PathBuf,
    workspace: TempDir,
    document: Option<PathBuf>,
    printed: Option<PathBuf>,
}

#[async_trait]
impl RenderSession for ChromiumSession {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn load(&mut self, markup: &str, page: &PageSetup) -> Result<(), EngineError> {
        let path = self.workspace.path().join(DOCUMENT_FILE);
        tokio::fs::write(&path, inject_print_css(markup, page))
            .await
            .map_err(|e| EngineError::Load(e.to_string()))?;
        self.document = Some(path);
        self.printed = None;
        Ok(())
    }

    async fn wait_until_settled(&mut self) -> Result<(), EngineError> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| EngineError::Load("no document loaded".to_string()))?;
        let output = self.workspace.path().join(OUTPUT_FILE);
        let profile = self.workspace.path().join(PROFILE_DIR);

        let child = Command::new(&self.binary)
            .args(HARDENED_FLAGS)
            .arg(format!("--user-data-dir={}", profile.display()))
            .arg(format!("--virtual-time-budget={VIRTUAL_TIME_BUDGET_MS}"))
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(file_url(document)?.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Launch(format!("{}: {e}", self.binary.display())))?;

        debug!("Chromium session {} waiting for layout to settle", self.id);
        let result = child.wait_with_output().await?;
        if !result.status.success() {
            return Err(EngineError::Crashed(format!(
                "{} ({})",
                result.status,
                stderr_tail(&result.stderr)
            )));
        }

        match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.len() > 0 => {
                self.printed = Some(output);
                Ok(())
            }
            Ok(_) => Err(EngineError::EmptyOutput),
            Err(e) => Err(EngineError::Print(format!(
                "chromium exited cleanly but wrote no output: {e}"
            ))),
        }
    }

    async fn print_to(&mut self, output: &Path) -> Result<(), EngineError> {
        let printed = self
            .printed
            .as_ref()
            .ok_or_else(|| EngineError::Print("layout has not settled".to_string()))?;
        tokio::fs::copy(printed, output)
            .await
            .map_err(|e| EngineError::Print(e.to_string()))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), EngineError> {
        let ChromiumSession { id, workspace, .. } = *self;
        tokio::task::spawn_blocking(move || workspace.close())
            .await
            .map_err(std::io::Error::other)??;
        debug!("Chromium session {id} workspace removed");
        Ok(())
    }
}

/// Puts the print stylesheet at the end of `<head>` so it wins over template styles.
fn inject_print_css(markup: &str, page: &PageSetup) -> String {
    let style = format!("<style>{}</style>", page.print_css());
    match markup.find("</head>") {
        Some(at) => {
            let mut out = String::with_capacity(markup.len() + style.len());
            out.push_str(&markup[..at]);
            out.push_str(&style);
            out.push_str(&markup[at..]);
            out
        }
        None => format!("{style}{markup}"),
    }
}

fn file_url(path: &Path) -> Result<Url, EngineError> {
    Url::from_file_path(path)
        .map_err(|()| EngineError::Load(format!("not an absolute path: {}", path.display())))
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let start = text
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| text.len() - i <= STDERR_TAIL)
        .unwrap_or(text.len());
    text[start..].to_string()
}

/// Resolves a bare program name against `PATH`; paths are checked as given.
fn resolve_binary(binary: &Path) -> Option<PathBuf> {
    if binary.components().count() > 1 || binary.is_absolute() {
        return binary.is_file().then(|| binary.to_path_buf());
    }
    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_print_css_into_head() {
        let markup = "<html><head><title>x</title></head><body></body></html>";
        let out = inject_print_css(markup, &PageSetup::default());
        let style_at = out.find("<style>@page").unwrap();
        assert!(style_at < out.find("</head>").unwrap());
        assert!(out.ends_with("<body></body></html>"));
    }

    #[test]
    fn test_inject_print_css_without_head() {
        let out = inject_print_css("<p>hi</p>", &PageSetup::default());
        assert!(out.starts_with("<style>@page"));
        assert!(out.ends_with("<p>hi</p>"));
    }

    #[test]
    fn test_stderr_tail_truncates_from_the_front() {
        let long = "x".repeat(2000) + "the end";
        let tail = stderr_tail(long.as_bytes());
        assert!(tail.len() <= STDERR_TAIL);
        assert!(tail.ends_with("the end"));
    }

    #[test]
    fn test_resolve_missing_binary() {
        assert!(resolve_binary(Path::new("/definitely/not/here/chromium")).is_none());
        assert!(resolve_binary(Path::new("no-such-browser-binary-xyz")).is_none());
    }

    #[tokio::test]
    async fn test_launch_fails_for_missing_binary() {
        let engine = ChromiumEngine::new("/definitely/not/here/chromium");
        let err = engine.launch().await.err().unwrap();
        assert!(matches!(err, EngineError::Launch(_)));
    }

    #[tokio::test]
    async fn test_close_removes_workspace() {
        let session = ChromiumSession {
            id: Uuid::new_v4(),
            binary: PathBuf::from("chromium"),
            workspace: tempfile::tempdir().unwrap(),
            document: None,
            printed: None,
        };
        let root = session.workspace.path().to_path_buf();
        let mut session: Box<dyn RenderSession> = Box::new(session);
        session.load("<html></html>", &PageSetup::default()).await.unwrap();
        assert!(root.join(DOCUMENT_FILE).exists());
        session.close().await.unwrap();
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_print_before_settle_is_an_error() {
        let mut session = ChromiumSession {
            id: Uuid::new_v4(),
            binary: PathBuf::from("chromium"),
            workspace: tempfile::tempdir().unwrap(),
            document: None,
            printed: None,
        };
        let dir = tempfile::tempdir().unwrap();
        let err = session.print_to(&dir.path().join("x.pdf")).await.unwrap_err();
        assert!(matches!(err, EngineError::Print(_)));
        assert!(session.wait_until_settled().await.is_err());
    }

    #[test]
    fn test_file_url_percent_encodes_path() {
        let url = file_url(Path::new("/tmp/a #b/%c?d/document.html")).unwrap();
        assert_eq!(url.as_str(), "file:///tmp/a%20%23b/%25c%3Fd/document.html");
        assert_eq!(url.to_file_path().unwrap(), Path::new("/tmp/a #b/%c?d/document.html"));
    }

    #[test]
    fn test_file_url_rejects_relative_path() {
        let err = file_url(Path::new("relative/document.html")).unwrap_err();
        assert!(matches!(err, EngineError::Load(_)));
    }

    // ── Scripted browser binaries ───────────────────────────────────────────

    #[cfg(unix)]
    mod scripted {
        use std::sync::Arc;
        use std::time::Duration;

        use super::*;
        use crate::render::adapter::RenderAdapter;

        const PRINTS_PDF: &str = r#"for arg in "$@"; do
  case "$arg" in
    --print-to-pdf=*) printf '%s' '%PDF-1.4 fake' > "${arg#--print-to-pdf=}" ;;
  esac
done"#;

        /// Writes an executable shell script standing in for Chromium. Every
        /// argument it receives is appended to `<name>.args`.
        fn browser(dir: &Path, name: &str, body: &str) -> PathBuf {
            use std::os::unix::fs::PermissionsExt;

            let path = dir.join(name);
            let script = format!(
                "#!/bin/sh\nfor arg in \"$@\"; do echo \"$arg\" >> '{}'; done\n{body}\n",
                dir.join(format!("{name}.args")).display()
            );
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        /// Session workspace the script was pointed at, via its `--user-data-dir`.
        fn workspace_of(dir: &Path, name: &str) -> PathBuf {
            let args = std::fs::read_to_string(dir.join(format!("{name}.args"))).unwrap();
            let profile = args
                .lines()
                .find_map(|line| line.strip_prefix("--user-data-dir="))
                .unwrap();
            Path::new(profile).parent().unwrap().to_path_buf()
        }

        fn adapter(binary: PathBuf, timeout: Duration) -> RenderAdapter {
            RenderAdapter::new(Arc::new(ChromiumEngine::new(binary)), timeout)
        }

        #[tokio::test]
        async fn test_successful_print_lands_at_destination() {
            let bin = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();
            let dest = out.path().join("a/b.pdf");
            let browser = browser(bin.path(), "okchrome", PRINTS_PDF);

            let path = adapter(browser, Duration::from_secs(30))
                .render_to_file("<html><head></head><body>Ali</body></html>", &dest)
                .await
                .unwrap();

            assert_eq!(path, dest);
            assert_eq!(std::fs::read_to_string(&dest).unwrap(), "%PDF-1.4 fake");
            let args = std::fs::read_to_string(bin.path().join("okchrome.args")).unwrap();
            assert!(args.lines().any(|line| line == "--no-sandbox"));
            assert!(args.lines().any(|line| line.starts_with("file:///")));
            assert!(!workspace_of(bin.path(), "okchrome").exists());
        }

        #[tokio::test]
        async fn test_non_zero_exit_is_a_crash() {
            let bin = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();
            let dest = out.path().join("out.pdf");
            let browser = browser(bin.path(), "crashchrome", "echo 'boom on stderr' >&2\nexit 3");

            let err = adapter(browser, Duration::from_secs(30))
                .render_to_file("<html></html>", &dest)
                .await
                .unwrap_err();

            match &err.cause {
                EngineError::Crashed(detail) => assert!(detail.contains("boom on stderr")),
                other => panic!("unexpected cause: {other}"),
            }
            assert!(!dest.exists());
            assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
            assert!(!workspace_of(bin.path(), "crashchrome").exists());
        }

        #[tokio::test]
        async fn test_clean_exit_without_output_is_a_print_failure() {
            let bin = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();
            let dest = out.path().join("out.pdf");
            let browser = browser(bin.path(), "mutechrome", "exit 0");

            let err = adapter(browser, Duration::from_secs(30))
                .render_to_file("<html></html>", &dest)
                .await
                .unwrap_err();

            assert!(matches!(err.cause, EngineError::Print(_)));
            assert!(!dest.exists());
            assert!(!workspace_of(bin.path(), "mutechrome").exists());
        }

        /// Running, or at least exited and awaiting reaping.
        #[cfg(target_os = "linux")]
        fn is_running(pid: &str) -> bool {
            match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
                Ok(stat) => stat
                    .rsplit_once(") ")
                    .map(|(_, rest)| !rest.starts_with('Z'))
                    .unwrap_or(false),
                Err(_) => false,
            }
        }

        #[cfg(target_os = "linux")]
        #[tokio::test]
        async fn test_hung_browser_is_killed_on_settle_timeout() {
            let bin = tempfile::tempdir().unwrap();
            let out = tempfile::tempdir().unwrap();
            let dest = out.path().join("out.pdf");
            let pid_file = bin.path().join("hangchrome.pid");
            let body = format!("echo $$ > '{}'\nexec sleep 30", pid_file.display());
            let browser = browser(bin.path(), "hangchrome", &body);

            let err = adapter(browser, Duration::from_secs(1))
                .render_to_file("<html></html>", &dest)
                .await
                .unwrap_err();

            assert!(matches!(err.cause, EngineError::SettleTimeout(_)));
            assert!(!dest.exists());
            assert!(!workspace_of(bin.path(), "hangchrome").exists());

            let pid = std::fs::read_to_string(&pid_file).unwrap();
            let pid = pid.trim();
            for _ in 0..50 {
                if !is_running(pid) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            assert!(!is_running(pid), "browser process {pid} outlived the render");
        }
    }
}
