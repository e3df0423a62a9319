pub mod layout;
mod auth;
mod config;
mod exam;
mod generating;
mod history;
mod results;

use crate::app::App;
use crate::models::AppState;
use ratatui::Frame;

pub use layout::{calculate_exam_chunks, calculate_screen_chunks};

pub fn draw(f: &mut Frame, app: &App) {
    match app.state {
        AppState::Auth => auth::draw_auth(f, app),
        AppState::Config => config::draw_config(f, app),
        AppState::Generating => generating::draw_generating(f, app),
        AppState::Exam => exam::draw_exam(f, app),
        AppState::Result => results::draw_results(f, app),
        AppState::History => history::draw_history(f, app),
    }
}
