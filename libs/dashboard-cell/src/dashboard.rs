use tracing::info;

use doctor_cell::models::Doctor;
use user_cell::models::User;

use crate::api::ApiClient;
use crate::fetch::{FetchHandle, FetchState};

pub const PROFILE_PATH: &str = "/users/profile/me";
pub const MY_APPOINTMENTS_PATH: &str = "/users/appointments/my-appointments";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Appointments,
    Settings,
}

/// Header card of the account page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCard {
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub blood_type: Option<String>,
}

impl From<&User> for ProfileCard {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            photo: user.photo.clone(),
            blood_type: user.blood_type.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    Loading,
    Failed(String),
    Ready(ProfileCard),
}

/// Patient account page: profile card, bookings tab and settings tab.
pub struct AccountDashboard {
    api: ApiClient,
    profile: FetchHandle<User>,
    appointments: FetchHandle<Vec<Doctor>>,
    tab: Tab,
    updated: Option<User>,
}

impl AccountDashboard {
    /// Start loading the profile and the default tab.
    pub fn open(api: ApiClient) -> Self {
        let dashboard = Self {
            profile: FetchHandle::new(api.clone()),
            appointments: FetchHandle::new(api.clone()),
            api,
            tab: Tab::default(),
            updated: None,
        };
        dashboard.profile.fetch(&dashboard.api.endpoint(PROFILE_PATH));
        dashboard.load_tab();
        dashboard
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Entering the bookings tab always refetches them.
    pub fn select_tab(&mut self, tab: Tab) {
        let reentering = tab == Tab::Appointments && self.tab != Tab::Appointments;
        self.tab = tab;
        if reentering && self.appointments.url().is_some() {
            self.appointments.reload();
        } else {
            self.load_tab();
        }
    }

    fn load_tab(&self) {
        if self.tab == Tab::Appointments {
            self.appointments.fetch(&self.api.endpoint(MY_APPOINTMENTS_PATH));
        }
    }

    pub fn view(&self) -> DashboardView {
        let state = self.profile.state();
        match (state.loading, state.error) {
            (true, _) => DashboardView::Loading,
            (false, Some(message)) => DashboardView::Failed(message),
            (false, None) => {
                let user = self.updated.as_ref().unwrap_or(&state.data);
                DashboardView::Ready(ProfileCard::from(user))
            }
        }
    }

    /// Show freshly saved settings without waiting for a refetch.
    pub fn apply_profile_update(&mut self, user: User) {
        self.updated = Some(user);
    }

    pub fn appointments_state(&self) -> FetchState<Vec<Doctor>> {
        self.appointments.state()
    }

    pub fn refresh(&self) {
        self.profile.reload();
        self.appointments.reload();
    }

    pub fn logout(&mut self) {
        self.api.logout();
        self.updated = None;
        info!("Logged out of account dashboard");
    }

    pub fn is_logged_in(&self) -> bool {
        self.api.is_authenticated()
    }

    /// Wait for every request the dashboard has started.
    pub async fn settled(&self) {
        self.profile.settled().await;
        self.appointments.settled().await;
    }
}
