use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{keys, load, save, KeyValueStore};
use crate::quiz::Quiz;

pub const PATH_SEPARATOR: &str = " > ";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub quizzes: Vec<Quiz>,
    #[serde(default)]
    pub subfolders: Vec<Folder>,
}

impl Folder {
    pub fn new(name: &str, parent_id: Option<&str>) -> Self {
        let now = Utc::now();
        let suffix: u16 = rand::thread_rng().gen();
        Folder {
            id: format!("{}{:04x}", now.timestamp_millis(), suffix),
            name: name.trim().to_owned(),
            created_at: now,
            parent_id: parent_id.map(str::to_owned),
            quizzes: Vec::new(),
            subfolders: Vec::new(),
        }
    }
}

/// A quiz together with where it lives in the folder tree.
#[derive(Clone, Debug, PartialEq)]
pub struct FolderQuiz {
    pub folder_id: String,
    pub folder_path: Vec<String>,
    pub quiz: Quiz,
}

impl FolderQuiz {
    pub fn folder_name(&self) -> String {
        self.folder_path.join(PATH_SEPARATOR)
    }
}

pub fn find_folder<'a>(folders: &'a [Folder], id: &str) -> Option<&'a Folder> {
    folders.iter().find_map(|folder| {
        if folder.id == id {
            Some(folder)
        } else {
            find_folder(&folder.subfolders, id)
        }
    })
}

/// Returns a new tree where the folder with `id` is replaced by `update(folder)`.
pub fn update_folder<F>(folders: &[Folder], id: &str, update: &mut F) -> Vec<Folder>
where
    F: FnMut(&Folder) -> Folder,
{
    folders
        .iter()
        .map(|folder| {
            if folder.id == id {
                update(folder)
            } else if folder.subfolders.is_empty() {
                folder.clone()
            } else {
                Folder {
                    subfolders: update_folder(&folder.subfolders, id, update),
                    ..folder.clone()
                }
            }
        })
        .collect()
}

/// Returns a new tree without the folder with `id` and everything below it.
pub fn remove_folder(folders: &[Folder], id: &str) -> Vec<Folder> {
    folders
        .iter()
        .filter(|folder| folder.id != id)
        .map(|folder| Folder {
            subfolders: remove_folder(&folder.subfolders, id),
            ..folder.clone()
        })
        .collect()
}

/// Every quiz in the tree, depth first, parents before their subfolders.
pub fn flatten_quizzes(folders: &[Folder]) -> Vec<FolderQuiz> {
    fn visit(folders: &[Folder], parent_path: &[String], result: &mut Vec<FolderQuiz>) {
        for folder in folders {
            let mut path = parent_path.to_vec();
            path.push(folder.name.clone());
            for quiz in &folder.quizzes {
                result.push(FolderQuiz {
                    folder_id: folder.id.clone(),
                    folder_path: path.clone(),
                    quiz: quiz.clone(),
                });
            }
            visit(&folder.subfolders, &path, result);
        }
    }

    let mut result = Vec::new();
    visit(folders, &[], &mut result);
    result
}

/// Folder tree persisted under a single key.
pub struct QuizStore<S> {
    store: S,
}

impl<S: KeyValueStore> QuizStore<S> {
    pub fn new(store: S) -> Self {
        QuizStore { store }
    }

    pub fn folders(&self) -> Result<Vec<Folder>> {
        Ok(load(&self.store, keys::FOLDERS)?)
    }

    fn replace_folders(&self, folders: &[Folder]) -> Result<()> {
        Ok(save(&self.store, keys::FOLDERS, folders)?)
    }

    pub fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<Folder> {
        if name.trim().is_empty() {
            return Err(anyhow!("Please enter a folder name."));
        }
        let folders = self.folders()?;
        let folder = Folder::new(name, parent_id);
        let folders = match parent_id {
            None => {
                let mut folders = folders;
                folders.push(folder.clone());
                folders
            }
            Some(parent_id) => {
                if find_folder(&folders, parent_id).is_none() {
                    return Err(anyhow!("Folder {} not found", parent_id));
                }
                update_folder(&folders, parent_id, &mut |parent| {
                    let mut parent = parent.clone();
                    parent.subfolders.push(folder.clone());
                    parent
                })
            }
        };
        self.replace_folders(&folders)?;
        info!("Created folder {:?} ({})", folder.name, folder.id);
        Ok(folder)
    }

    pub fn delete_folder(&self, id: &str) -> Result<Folder> {
        let folders = self.folders()?;
        let removed = find_folder(&folders, id)
            .cloned()
            .ok_or_else(|| anyhow!("Folder {} not found", id))?;
        self.replace_folders(&remove_folder(&folders, id))?;
        info!("Deleted folder {:?} ({})", removed.name, removed.id);
        Ok(removed)
    }

    pub fn save(&self, folder_id: &str, quiz: Quiz) -> Result<()> {
        let folders = self.folders()?;
        if find_folder(&folders, folder_id).is_none() {
            return Err(anyhow!("Folder {} not found", folder_id));
        }
        let folders = update_folder(&folders, folder_id, &mut |folder| {
            let mut folder = folder.clone();
            folder.quizzes.push(quiz.clone());
            folder
        });
        self.replace_folders(&folders)
    }

    pub fn delete(&self, folder_id: &str, quiz_id: &str) -> Result<Quiz> {
        let folders = self.folders()?;
        let quiz = find_folder(&folders, folder_id)
            .ok_or_else(|| anyhow!("Folder {} not found", folder_id))?
            .quizzes
            .iter()
            .find(|quiz| quiz.id == quiz_id)
            .cloned()
            .ok_or_else(|| anyhow!("Quiz {} not found in folder {}", quiz_id, folder_id))?;
        let folders = update_folder(&folders, folder_id, &mut |folder| Folder {
            quizzes: folder
                .quizzes
                .iter()
                .filter(|quiz| quiz.id != quiz_id)
                .cloned()
                .collect(),
            ..folder.clone()
        });
        self.replace_folders(&folders)?;
        info!("Deleted quiz {:?} ({})", quiz.title, quiz.id);
        Ok(quiz)
    }

    pub fn list_by_folder(&self, folder_id: &str) -> Result<Vec<Quiz>> {
        let folders = self.folders()?;
        find_folder(&folders, folder_id)
            .map(|folder| folder.quizzes.clone())
            .ok_or_else(|| anyhow!("Folder {} not found", folder_id))
    }

    pub fn all_quizzes(&self) -> Result<Vec<FolderQuiz>> {
        Ok(flatten_quizzes(&self.folders()?))
    }

    pub fn find_quiz(&self, quiz_id: &str) -> Result<Option<FolderQuiz>> {
        Ok(self
            .all_quizzes()?
            .into_iter()
            .find(|entry| entry.quiz.id == quiz_id))
    }
}
