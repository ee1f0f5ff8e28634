//! Version derivation from git tags.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use git2::{Oid, Repository, Sort};

/// Derive a version from the newest tag reachable from `HEAD`.
///
/// Tags are only considered when their name starts with `tag_prefix` and the
/// remainder looks like a version. If `HEAD` is the tagged commit the tag's
/// version is returned as-is; otherwise the distance and abbreviated commit
/// are appended as `<version>.post<N>+g<sha>`. Returns `Ok(None)` when the
/// repository has no matching tag reachable from `HEAD`.
pub fn version_from_tags(repo_dir: &Path, tag_prefix: &str) -> Result<Option<String>> {
    let repo = Repository::discover(repo_dir)
        .with_context(|| format!("no git repository at {}", repo_dir.display()))?;

    let head = repo
        .head()
        .context("repository has no HEAD")?
        .peel_to_commit()
        .context("HEAD does not point at a commit")?;

    let tagged = tagged_commits(&repo, tag_prefix)?;
    if tagged.is_empty() {
        return Ok(None);
    }

    let mut walk = repo.revwalk()?;
    walk.push(head.id())?;
    walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

    for (distance, oid) in walk.enumerate() {
        let oid = oid?;
        if let Some(version) = tagged.get(&oid) {
            if distance == 0 {
                return Ok(Some(version.clone()));
            }
            let short = &head.id().to_string()[..7];
            return Ok(Some(format!("{}.post{}+g{}", version, distance, short)));
        }
    }

    Ok(None)
}

/// Map each tagged commit to the highest version tagged on it.
fn tagged_commits(repo: &Repository, tag_prefix: &str) -> Result<HashMap<Oid, String>> {
    let mut tagged: HashMap<Oid, String> = HashMap::new();

    let names = repo.tag_names(None)?;
    for name in names.iter().flatten() {
        let Some(version) = name.strip_prefix(tag_prefix) else {
            continue;
        };
        if crate::core::metadata::validate_version(version).is_err() {
            tracing::debug!("ignoring tag `{}`: not a version", name);
            continue;
        }

        let commit = match repo
            .revparse_single(&format!("refs/tags/{}", name))
            .and_then(|obj| obj.peel_to_commit())
        {
            Ok(commit) => commit,
            Err(e) => {
                tracing::debug!("ignoring tag `{}`: {}", name, e);
                continue;
            }
        };

        let entry = tagged.entry(commit.id()).or_insert_with(|| version.to_string());
        if version_key(version) > version_key(entry.as_str()) {
            *entry = version.to_string();
        }
    }

    Ok(tagged)
}

/// Numeric release components for ordering tags on the same commit.
fn version_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map_while(|part| part.parse::<u64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Commit, Signature};
    use tempfile::TempDir;

    fn commit(repo: &Repository, file: &str) -> Oid {
        let workdir = repo.workdir().unwrap().to_path_buf();
        std::fs::write(workdir.join(file), file).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::now("Flint Dev", "dev@example.com").unwrap();
        let parent: Option<Commit<'_>> = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, file, &tree, &parents)
            .unwrap()
    }

    fn tag(repo: &Repository, name: &str, oid: Oid) {
        let obj = repo.find_object(oid, None).unwrap();
        repo.tag_lightweight(name, &obj, false).unwrap();
    }

    #[test]
    fn test_exact_tag() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let c1 = commit(&repo, "a.txt");
        tag(&repo, "v0.1.2", c1);

        assert_eq!(
            version_from_tags(tmp.path(), "v").unwrap(),
            Some("0.1.2".to_string())
        );
    }

    #[test]
    fn test_commits_after_tag() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let c1 = commit(&repo, "a.txt");
        tag(&repo, "v0.1.2", c1);
        commit(&repo, "b.txt");
        let head = commit(&repo, "c.txt");

        let version = version_from_tags(tmp.path(), "v").unwrap().unwrap();
        let short = &head.to_string()[..7];
        assert_eq!(version, format!("0.1.2.post2+g{}", short));
        assert!(crate::core::metadata::validate_version(&version).is_ok());
    }

    #[test]
    fn test_no_matching_tag() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let c1 = commit(&repo, "a.txt");
        tag(&repo, "release-candidate", c1);

        assert_eq!(version_from_tags(tmp.path(), "v").unwrap(), None);
    }

    #[test]
    fn test_highest_tag_on_same_commit_wins() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let c1 = commit(&repo, "a.txt");
        tag(&repo, "v0.9", c1);
        tag(&repo, "v0.10", c1);

        assert_eq!(
            version_from_tags(tmp.path(), "v").unwrap(),
            Some("0.10".to_string())
        );
    }

    #[test]
    fn test_no_repository_is_error() {
        let tmp = TempDir::new().unwrap();
        // Only meaningful when the temp dir is not itself inside a repository.
        if Repository::discover(tmp.path()).is_err() {
            assert!(version_from_tags(tmp.path(), "v").is_err());
        }
    }
}
