use crate::client::api::{ApiError, MovieApi};
use crate::client::form::MovieForm;
use crate::client::list::MovieListController;
use crate::models::error::FieldError;
use crate::models::movie::{MovieResponse, MovieUpdateRequest};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Add,
    Edit(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open,
    Submitting,
}

/// Result of pressing the dialog's submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved and closed; the list was reloaded from page 1.
    Saved,
    /// Rejected by the client-side rules; nothing was sent.
    Invalid,
    /// Sent and rejected by the server; the dialog stays open.
    Rejected,
    /// The dialog was not open.
    Ignored,
}

/// Add or edit dialog wrapping a [`MovieForm`].
#[derive(Debug, Clone)]
pub struct MovieDialog {
    mode: DialogMode,
    state: DialogState,
    source: Option<MovieResponse>,
    form: MovieForm,
    field_errors: Vec<FieldError>,
    alert: Option<String>,
}

impl MovieDialog {
    pub fn add() -> Self {
        Self {
            mode: DialogMode::Add,
            state: DialogState::Closed,
            source: None,
            form: MovieForm::default(),
            field_errors: Vec::new(),
            alert: None,
        }
    }

    pub fn edit(movie: &MovieResponse) -> Self {
        Self {
            mode: DialogMode::Edit(movie.id),
            source: Some(movie.clone()),
            form: MovieForm::from_movie(movie),
            ..Self::add()
        }
    }

    pub fn mode(&self) -> DialogMode {
        self.mode
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != DialogState::Closed
    }

    pub fn form(&self) -> &MovieForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut MovieForm {
        &mut self.form
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Opens with a fresh form: blank for add, the selected record for edit.
    pub fn open(&mut self) {
        self.form = match &self.source {
            Some(movie) => MovieForm::from_movie(movie),
            None => MovieForm::default(),
        };
        self.field_errors.clear();
        self.alert = None;
        self.state = DialogState::Open;
    }

    pub fn close(&mut self) {
        self.state = DialogState::Closed;
    }

    pub async fn submit<A: MovieApi + ?Sized>(&mut self, api: &A, list: &mut MovieListController) -> SubmitOutcome {
        if self.state != DialogState::Open {
            return SubmitOutcome::Ignored;
        }

        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(errors) => {
                self.field_errors = errors;
                return SubmitOutcome::Invalid;
            }
        };

        self.field_errors.clear();
        self.alert = None;
        self.state = DialogState::Submitting;

        let result = match self.mode {
            DialogMode::Add => api.create_movie(&request).await,
            DialogMode::Edit(id) => api.update_movie(&id, &MovieUpdateRequest::from(&request)).await,
        };

        match result {
            Ok(_) => {
                self.state = DialogState::Closed;
                if let Err(e) = list.refetch(api).await {
                    warn!(error = %e, "reloading movies after save failed");
                }
                SubmitOutcome::Saved
            }
            Err(error) => {
                self.state = DialogState::Open;
                self.report(error);
                SubmitOutcome::Rejected
            }
        }
    }

    fn report(&mut self, error: ApiError) {
        let action = match self.mode {
            DialogMode::Add => "add",
            DialogMode::Edit(_) => "update",
        };

        if error.field_errors().is_empty() {
            self.alert = Some(format!("Failed to {} movie: {}", action, error));
        } else {
            self.field_errors = error.field_errors().to_vec();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Closed,
    Confirming,
    Deleting,
}

/// Delete confirmation dialog for one record.
#[derive(Debug, Clone)]
pub struct DeleteDialog {
    movie_id: Uuid,
    title: String,
    state: DeleteState,
    alert: Option<String>,
}

impl DeleteDialog {
    pub fn new(movie: &MovieResponse) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            state: DeleteState::Closed,
            alert: None,
        }
    }

    pub fn state(&self) -> DeleteState {
        self.state
    }

    pub fn prompt(&self) -> String {
        format!("Are you sure you want to delete {}? This action cannot be undone.", self.title)
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn open(&mut self) {
        self.alert = None;
        self.state = DeleteState::Confirming;
    }

    pub fn cancel(&mut self) {
        self.state = DeleteState::Closed;
    }

    /// Sends the delete. Does nothing unless the confirmation step is showing.
    pub async fn confirm<A: MovieApi + ?Sized>(&mut self, api: &A, list: &mut MovieListController) -> SubmitOutcome {
        if self.state != DeleteState::Confirming {
            return SubmitOutcome::Ignored;
        }

        self.state = DeleteState::Deleting;
        match api.delete_movie(&self.movie_id).await {
            Ok(()) => {
                self.state = DeleteState::Closed;
                if let Err(e) = list.refetch(api).await {
                    warn!(error = %e, "reloading movies after delete failed");
                }
                SubmitOutcome::Saved
            }
            Err(error) => {
                warn!(movie_id = %self.movie_id, error = %error, "delete failed");
                self.state = DeleteState::Confirming;
                self.alert = Some("Failed to delete movie. Try again.".to_string());
                SubmitOutcome::Rejected
            }
        }
    }
}
