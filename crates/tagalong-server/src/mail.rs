//! [`MailChannel`]: outbound notification delivery.
//!
//! With a relay configured, each message is POSTed as JSON
//! (`{"to","subject","body"}`) to the relay URL. Without one, messages are
//! written to the log and count as delivered.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tagalong_core::ports::NotificationChannel;
use tracing::info;

use crate::Error;

pub enum MailChannel {
  Relay { client: Client, url: String },
  Log,
}

#[derive(Serialize)]
struct Message<'a> {
  to:      &'a str,
  subject: &'a str,
  body:    &'a str,
}

impl MailChannel {
  pub fn from_config(relay_url: Option<&str>) -> Result<Self, Error> {
    match relay_url.map(str::trim).filter(|u| !u.is_empty()) {
      Some(url) => {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self::Relay { client, url: url.to_owned() })
      }
      None => Ok(Self::Log),
    }
  }
}

impl NotificationChannel for MailChannel {
  type Error = Error;

  async fn deliver(&self, address: &str, subject: &str, body: &str) -> Result<(), Error> {
    let (client, url) = match self {
      Self::Relay { client, url } => (client, url),
      Self::Log => {
        info!(to = %address, %subject, "no mail relay configured; message logged only");
        return Ok(());
      }
    };

    let resp = client
      .post(url.as_str())
      .json(&Message { to: address, subject, body })
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Upstream { service: "mail relay", status, body });
    }
    Ok(())
  }
}
