use thirtyfour::{ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::configuration::WebdriverSettings;

/// A loaded-page source provider. The scrapers only ever need "navigate and
/// hand me the rendered document", so tests can stand in for the browser.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn visit(&self, url: &str) -> anyhow::Result<String>;
}

/// One shared browser session, reused across every company and every task.
pub struct Scout {
    pub driver: WebDriver,
}

impl Scout {
    pub async fn new(settings: &WebdriverSettings) -> anyhow::Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if settings.headless {
            caps.set_headless()?;
        }

        let driver = WebDriver::new(&settings.url, caps).await?;
        driver.maximize_window().await?;

        Ok(Scout { driver })
    }

    pub async fn quit(self) -> anyhow::Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}

impl PageSource for Scout {
    async fn visit(&self, url: &str) -> anyhow::Result<String> {
        self.driver.goto(url).await?;
        let source = self.driver.source().await?;
        Ok(source)
    }
}
