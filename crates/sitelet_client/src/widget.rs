//! The "say hi to the server" widget shown on the home page.
//!
//! Data flow: text input ([`Var`]) → [`Submitter`] (on "Send") →
//! [`map_async`] over [`Remote::reverse_string`] → response view.

use std::rc::Rc;

use futures::task::LocalSpawn;
use maud::{Markup, html};

use crate::reactive::{AsyncResult, Session, Submitter, Var, View, map_async};
use crate::{Remote, RemoteError, RemoteTransport};

/// Shown while a request is in flight.
pub const PENDING_TEXT: &str = "Waiting for the server...";

/// Blank input cannot be submitted.
pub fn submittable(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub struct Reverser {
    input: Var<String>,
    submitter: Submitter<String>,
    reversed: View<AsyncResult<String, RemoteError>>,
}

impl Reverser {
    pub fn new<T, S>(session: &Session, remote: Rc<Remote<T>>, spawner: S) -> Self
    where
        T: RemoteTransport + 'static,
        S: LocalSpawn + 'static,
    {
        let input = Var::new(session, String::new());
        let submitter = Submitter::new(session, input.view().map(|text: &String| submittable(text)));
        let reversed = map_async(session, submitter.view(), spawner, move |text: String| {
            let remote = Rc::clone(&remote);
            async move { remote.reverse_string(text).await }
        });

        Self {
            input,
            submitter,
            reversed,
        }
    }

    /// The text box.
    pub fn input(&self) -> &Var<String> {
        &self.input
    }

    /// The "Send" button.
    pub fn send(&self) {
        self.submitter.trigger();
    }

    pub fn reversed(&self) -> &View<AsyncResult<String, RemoteError>> {
        &self.reversed
    }

    /// Text shown under "The server responded:".
    pub fn response_text(&self) -> String {
        match self.reversed.get() {
            AsyncResult::Idle => String::new(),
            AsyncResult::Pending => PENDING_TEXT.to_string(),
            AsyncResult::Success(text) => text,
            AsyncResult::Failure(err) => format!("Error: {}", err),
        }
    }

    /// Current markup of the widget.
    ///
    /// The input and the Send button form a form without an action, so
    /// submitting it posts `input` back to the page that rendered it.
    pub fn render(&self) -> Markup {
        let failed = self.reversed.get().failure().is_some();
        html! {
            div data-widget="reverser" {
                form method="post" {
                    input type="text" name="input" value=(self.input.get());
                    button type="submit" { "Send" }
                }
                hr;
                h4 class="text-muted" {
                    "The server responded:"
                    div class="jumbotron" {
                        h1 class=[failed.then_some("text-danger")] { (self.response_text()) }
                    }
                }
            }
        }
    }
}
