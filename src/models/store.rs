use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{code::next_code, package::BiddingPackage, project::Project};

/// Current schema version
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
pub struct Store {
    pub version: u32,
    pub projects: Vec<Project>,
    pub packages: Vec<BiddingPackage>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            projects: vec![],
            packages: vec![],
        }
    }
}

impl Store {
    /// Inserts a project, assigning its code from the category prefix and
    /// the start date's year. Codes of deleted projects still count so a
    /// soft-deleted project never frees its code.
    pub fn add_project(&mut self, mut project: Project) -> &Project {
        project.code = next_code(
            self.projects.iter().map(|p| p.code.as_str()),
            project.category.prefix(),
            project.start_date.year(),
        );
        self.projects.push(project);
        self.projects.last().unwrap()
    }

    /// Inserts a bidding package, assigning its `GT-{year}-{seq}` code.
    pub fn add_package(&mut self, mut package: BiddingPackage, year: i16) -> &BiddingPackage {
        package.code = next_code(self.packages.iter().map(|p| p.code.as_str()), "GT", year);
        self.packages.push(package);
        self.packages.last().unwrap()
    }

    pub fn get_project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn get_project_by_code(&self, code: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.code == code)
    }

    pub fn get_project_by_code_mut(&mut self, code: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.code == code)
    }

    pub fn get_active_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| !p.is_deleted())
    }

    pub fn get_deleted_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.is_deleted())
    }

    pub fn get_package(&self, id: Uuid) -> Option<&BiddingPackage> {
        self.packages.iter().find(|p| p.id == id)
    }

    pub fn get_package_by_code_mut(&mut self, code: &str) -> Option<&mut BiddingPackage> {
        self.packages.iter_mut().find(|p| p.code == code)
    }

    pub fn get_packages_for_project(&self, project_id: Uuid) -> impl Iterator<Item = &BiddingPackage> {
        self.packages.iter().filter(move |p| p.project_id == project_id)
    }
}
