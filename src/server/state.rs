use crate::admission::AdmissionService;

pub struct AppState {
    pub admissions: AdmissionService,
}
