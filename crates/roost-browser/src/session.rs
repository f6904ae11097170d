use crate::{PageDriver, Result};
use async_trait::async_trait;
use roost_core::{Config, CookieStore};
use std::path::Path;
use std::time::Duration;

const COMPOSE_URL: &str = "https://x.com/compose/post";

// X login flow
const USERNAME_INPUT: &str = "input[autocomplete=\"username\"]";
const PASSWORD_INPUT: &str = "input[name=\"password\"]";
const LOGIN_BUTTON: &str = "[data-testid=\"LoginForm_Login_Button\"]";

// Compose surface
const COMPOSER: &str = "[data-testid=\"tweetTextArea_0\"]";
const FILE_INPUT: &str = "input[data-testid=\"fileInput\"]";
const ATTACHMENT_PREVIEW: &str = "[data-testid=\"attachments\"]";
const POST_BUTTON: &str = "[data-testid=\"tweetButton\"]";

// Page-state extractions. Both must evaluate to a boolean.
const LOGIN_FORM_VISIBLE: &str = "document.querySelector('input[autocomplete=\"username\"]') !== null || window.location.pathname.startsWith('/i/flow/login')";
const POST_SUBMITTED: &str = "document.querySelector('[data-testid=\"toast\"]') !== null || document.querySelector('[data-testid=\"tweetTextArea_0\"]')?.textContent === ''";

const LOGIN_SETTLE_TIMEOUT: Duration = Duration::from_secs(15);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const SUBMIT_SETTLE: Duration = Duration::from_secs(2);

/// The capability the HTTP service is written against
#[async_trait]
pub trait Poster: Send {
    /// Publish a post, optionally with an attached image. All failures
    /// collapse to `false`.
    async fn post_content(&mut self, content: &str, image: Option<&Path>) -> bool;

    /// Release the browser session
    async fn cleanup(&mut self);
}

/// Drives one browser session through the login-and-post sequence
pub struct PostSession<D: PageDriver> {
    driver: D,
    store: CookieStore,
    username: String,
    password: String,
}

impl<D: PageDriver> PostSession<D> {
    pub fn new(driver: D, config: &Config) -> Self {
        Self {
            driver,
            store: CookieStore::new(config.cookie_file.clone()),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Inject any previously persisted cookies so a valid prior login is
    /// reused instead of repeated
    pub async fn init(&mut self) -> Result<()> {
        let cookies = self.store.load()?;
        if !cookies.is_empty() {
            tracing::info!(count = cookies.len(), "Restoring session cookies");
            self.driver.set_cookies(cookies).await?;
        }
        Ok(())
    }

    async fn try_post(&mut self, content: &str, image: Option<&Path>) -> Result<bool> {
        tracing::info!("Navigating to compose page");
        self.driver.goto(COMPOSE_URL).await?;

        if self.driver.eval_bool(LOGIN_FORM_VISIBLE).await? {
            tracing::info!("Login required, proceeding with login");
            self.login().await?;
        }

        tracing::info!("Entering post content");
        self.driver.type_text(COMPOSER, content).await?;

        if let Some(path) = image {
            tracing::info!(path = %path.display(), "Attaching image");
            self.driver.set_input_files(FILE_INPUT, path).await?;
            self.driver
                .wait_for(ATTACHMENT_PREVIEW, UPLOAD_TIMEOUT)
                .await?;
        }

        tracing::info!("Submitting post");
        self.driver.click(POST_BUTTON).await?;
        tokio::time::sleep(SUBMIT_SETTLE).await;

        let success = self.driver.eval_bool(POST_SUBMITTED).await?;
        tracing::info!(success, "Post submission result");
        Ok(success)
    }

    async fn login(&mut self) -> Result<()> {
        self.driver
            .type_text(USERNAME_INPUT, &self.username)
            .await?;
        self.driver.press_key(USERNAME_INPUT, "Enter").await?;

        self.driver
            .wait_for(PASSWORD_INPUT, LOGIN_SETTLE_TIMEOUT)
            .await?;
        self.driver
            .type_text(PASSWORD_INPUT, &self.password)
            .await?;
        self.driver.click(LOGIN_BUTTON).await?;

        // Logged-in landing pages carry the inline composer
        self.driver.wait_for(COMPOSER, LOGIN_SETTLE_TIMEOUT).await?;

        let cookies = self.driver.cookies().await?;
        self.store.save(&cookies)?;
        Ok(())
    }
}

#[async_trait]
impl<D: PageDriver> Poster for PostSession<D> {
    async fn post_content(&mut self, content: &str, image: Option<&Path>) -> bool {
        match self.try_post(content, image).await {
            Ok(success) => success,
            Err(e) => {
                tracing::error!("Failed to post: {}", e);
                false
            }
        }
    }

    async fn cleanup(&mut self) {
        if let Err(e) = self.driver.close().await {
            tracing::warn!("Error during session cleanup: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use roost_core::CookieRecord;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockState {
        log: Vec<String>,
        injected_cookies: Vec<CookieRecord>,
    }

    /// Scripted driver: records every operation and fails on demand
    struct MockDriver {
        state: Arc<Mutex<MockState>>,
        login_visible: bool,
        post_success: bool,
        fail_on: Option<&'static str>,
    }

    impl MockDriver {
        fn new(login_visible: bool, post_success: bool) -> Self {
            Self {
                state: Arc::new(Mutex::new(MockState::default())),
                login_visible,
                post_success,
                fail_on: None,
            }
        }

        fn failing_on(op: &'static str) -> Self {
            let mut mock = Self::new(false, true);
            mock.fail_on = Some(op);
            mock
        }

        fn record(&self, op: &str, detail: &str) -> Result<()> {
            if self.fail_on == Some(op) {
                return Err(Error::Browser(format!("injected failure in {}", op)));
            }
            self.state
                .lock()
                .unwrap()
                .log
                .push(format!("{}:{}", op, detail));
            Ok(())
        }

        fn log(&self) -> Vec<String> {
            self.state.lock().unwrap().log.clone()
        }
    }

    #[async_trait]
    impl PageDriver for &MockDriver {
        async fn goto(&self, url: &str) -> Result<()> {
            self.record("goto", url)
        }

        async fn click(&self, selector: &str) -> Result<()> {
            self.record("click", selector)
        }

        async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
            self.record("type", &format!("{}={}", selector, text))
        }

        async fn press_key(&self, selector: &str, key: &str) -> Result<()> {
            self.record("press", &format!("{}={}", selector, key))
        }

        async fn set_input_files(&self, selector: &str, path: &Path) -> Result<()> {
            self.record("files", &format!("{}={}", selector, path.display()))
        }

        async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<()> {
            self.record("wait", selector)
        }

        async fn eval_bool(&self, script: &str) -> Result<bool> {
            self.record("eval", script)?;
            if script.contains("flow/login") {
                Ok(self.login_visible)
            } else {
                Ok(self.post_success)
            }
        }

        async fn cookies(&self) -> Result<Vec<CookieRecord>> {
            self.record("cookies", "")?;
            Ok(vec![CookieRecord {
                name: "auth_token".to_string(),
                value: "fresh".to_string(),
                domain: Some(".x.com".to_string()),
                path: Some("/".to_string()),
                rest: serde_json::Map::new(),
            }])
        }

        async fn set_cookies(&self, cookies: Vec<CookieRecord>) -> Result<()> {
            self.record("set_cookies", &cookies.len().to_string())?;
            self.state.lock().unwrap().injected_cookies = cookies;
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            self.record("close", "")
        }
    }

    fn test_config(dir: &tempfile::TempDir) -> Config {
        let cookie_file = dir.path().join("cookies.json");
        Config::from_lookup(|key| match key {
            "ROOST_CDP_URL" => Some("ws://localhost:9222".to_string()),
            "ROOST_CDP_API_KEY" => Some("key".to_string()),
            "ROOST_USERNAME" => Some("bird".to_string()),
            "ROOST_PASSWORD" => Some("hunter2".to_string()),
            "ROOST_COOKIE_FILE" => Some(cookie_file.display().to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_logged_in_session_skips_login() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockDriver::new(false, true);
        let mut session = PostSession::new(&mock, &test_config(&dir));

        let posted = session.post_content("hello world", None).await;

        assert!(posted);
        let log = mock.log();
        assert!(
            !log.iter().any(|op| op.contains("password")),
            "login sequence must be skipped: {:?}",
            log
        );
        assert!(log.iter().any(|op| op.starts_with("click:[data-testid=\"tweetButton\"]")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_runs_and_persists_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockDriver::new(true, true);
        let config = test_config(&dir);
        let mut session = PostSession::new(&mock, &config);

        let posted = session.post_content("hello", None).await;

        assert!(posted);
        let log = mock.log();
        assert!(log.iter().any(|op| op.contains("autocomplete=\"username\"]=bird")));
        assert!(log.iter().any(|op| op.contains("name=\"password\"]=hunter2")));

        // Login must persist the fresh cookies
        let stored = CookieStore::new(config.cookie_file.clone()).load().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "auth_token");
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_injects_stored_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        CookieStore::new(config.cookie_file.clone())
            .save(&[CookieRecord {
                name: "auth_token".to_string(),
                value: "stored".to_string(),
                domain: None,
                path: None,
                rest: serde_json::Map::new(),
            }])
            .unwrap();

        let mock = MockDriver::new(false, true);
        let mut session = PostSession::new(&mock, &config);
        session.init().await.unwrap();

        assert_eq!(mock.state.lock().unwrap().injected_cookies.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_without_cookie_file_injects_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockDriver::new(false, true);
        let mut session = PostSession::new(&mock, &test_config(&dir));

        session.init().await.unwrap();

        assert!(mock.log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_is_attached_before_submit() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockDriver::new(false, true);
        let mut session = PostSession::new(&mock, &test_config(&dir));

        let posted = session
            .post_content("with image", Some(Path::new("/tmp/pic.png")))
            .await;

        assert!(posted);
        let log = mock.log();
        let attach = log
            .iter()
            .position(|op| op.starts_with("files:"))
            .expect("image should be attached");
        let submit = log
            .iter()
            .position(|op| op.starts_with("click:[data-testid=\"tweetButton\"]"))
            .expect("post should be submitted");
        assert!(attach < submit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_failure_collapses_to_false() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockDriver::failing_on("click");
        let mut session = PostSession::new(&mock, &test_config(&dir));

        assert!(!session.post_content("hello", None).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsuccessful_submission_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockDriver::new(false, false);
        let mut session = PostSession::new(&mock, &test_config(&dir));

        assert!(!session.post_content("hello", None).await);
    }
}
