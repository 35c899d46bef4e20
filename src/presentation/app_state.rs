// Application state for HTTP handlers
use crate::application::chat_service::ChatService;
use crate::application::current_dashboard_service::CurrentDashboardService;
use crate::application::saved_dashboard_service::SavedDashboardService;

#[derive(Clone)]
pub struct AppState {
    pub chat_service: ChatService,
    pub current_dashboard_service: CurrentDashboardService,
    pub saved_dashboard_service: SavedDashboardService,
}
