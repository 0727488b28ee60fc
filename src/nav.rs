//! Precomputed navigation lookup tables.
//!
//! The tables are produced offline (graph node list, per-node embeddings,
//! node-pair direction distributions) and loaded once at startup. They are
//! immutable afterwards; environments share them behind an `Arc`. Missing or
//! malformed files are a construction error, not something the environment
//! layer recovers from.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};

use crate::game::Pos;

/// Size of the discrete action space the direction tables are indexed by.
pub const NUM_ACTIONS: usize = 5;

pub struct NavTables {
    node_coords: Vec<Pos>,
    coords_to_node: HashMap<Pos, usize>,
    embeddings: Vec<Vec<f32>>,
    embed_dim: usize,
    /// `distributions[from][to]` is the action distribution for heading
    /// from node `from` toward node `to`.
    distributions: Vec<Vec<[f32; NUM_ACTIONS]>>,
    /// Derived: an action is valid at a node iff some target distribution
    /// gives it nonzero mass.
    valid_actions: Vec<[f32; NUM_ACTIONS]>,
}

impl NavTables {
    /// Load `node_coords.json`, `node_embeddings.npy` and
    /// `action_distributions.npy` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let coords_path = dir.join("node_coords.json");
        let coords_text = fs::read_to_string(&coords_path)
            .with_context(|| format!("failed to read {}", coords_path.display()))?;
        let node_coords: Vec<Pos> = serde_json::from_str(&coords_text)
            .with_context(|| format!("failed to parse {}", coords_path.display()))?;

        let (embed_shape, embed_data) = read_npy_floats(&dir.join("node_embeddings.npy"))?;
        ensure!(
            embed_shape.len() == 2 && embed_shape[0] as usize == node_coords.len(),
            "node_embeddings.npy has shape {:?}, expected [{}, _]",
            embed_shape,
            node_coords.len()
        );
        let embed_dim = embed_shape[1] as usize;
        let embeddings = embed_data
            .chunks_exact(embed_dim)
            .map(|row| row.to_vec())
            .collect();

        let (dist_shape, dist_data) = read_npy_floats(&dir.join("action_distributions.npy"))?;
        let n = node_coords.len();
        ensure!(
            dist_shape == [n as u64, n as u64, NUM_ACTIONS as u64],
            "action_distributions.npy has shape {:?}, expected [{n}, {n}, {NUM_ACTIONS}]",
            dist_shape
        );
        let distributions = dist_data
            .chunks_exact(NUM_ACTIONS)
            .map(|row| {
                let mut actions = [0.0; NUM_ACTIONS];
                actions.copy_from_slice(row);
                actions
            })
            .collect::<Vec<_>>()
            .chunks_exact(n)
            .map(|row| row.to_vec())
            .collect();

        Self::from_parts(node_coords, embeddings, distributions)
    }

    /// Assemble tables from already-loaded data, deriving the action
    /// validity rows.
    pub fn from_parts(
        node_coords: Vec<Pos>,
        embeddings: Vec<Vec<f32>>,
        distributions: Vec<Vec<[f32; NUM_ACTIONS]>>,
    ) -> Result<Self> {
        let n = node_coords.len();
        ensure!(n > 0, "navigation tables are empty");
        ensure!(
            embeddings.len() == n,
            "{} embeddings for {n} nodes",
            embeddings.len()
        );
        let embed_dim = embeddings[0].len();
        ensure!(
            embeddings.iter().all(|row| row.len() == embed_dim),
            "embeddings have inconsistent widths"
        );
        ensure!(
            distributions.len() == n && distributions.iter().all(|row| row.len() == n),
            "action distributions are not a {n}x{n} table"
        );

        let valid_actions = distributions
            .iter()
            .map(|targets| {
                let mut row = [0.0; NUM_ACTIONS];
                for dist in targets {
                    for (valid, mass) in row.iter_mut().zip(dist) {
                        if *mass != 0.0 {
                            *valid = 1.0;
                        }
                    }
                }
                row
            })
            .collect();

        let coords_to_node = node_coords
            .iter()
            .enumerate()
            .map(|(i, &pos)| (pos, i))
            .collect();

        Ok(Self {
            node_coords,
            coords_to_node,
            embeddings,
            embed_dim,
            distributions,
            valid_actions,
        })
    }

    pub fn len(&self) -> usize {
        self.node_coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_coords.is_empty()
    }

    pub fn embed_dim(&self) -> usize {
        self.embed_dim
    }

    /// The graph node at `pos`, if that cell is navigable.
    pub fn node_index(&self, pos: Pos) -> Option<usize> {
        self.coords_to_node.get(&pos).copied()
    }

    pub fn embedding(&self, node: usize) -> &[f32] {
        &self.embeddings[node]
    }

    /// Direction distribution for heading from `from` toward `to`.
    pub fn distribution(&self, from: usize, to: usize) -> [f32; NUM_ACTIONS] {
        self.distributions[from][to]
    }

    /// Action-validity indicators for a node (1.0 = valid).
    pub fn valid_actions(&self, node: usize) -> [f32; NUM_ACTIONS] {
        self.valid_actions[node]
    }
}

/// Read a little-endian float .npy array, accepting f32 or f64 payloads.
fn read_npy_floats(path: &Path) -> Result<(Vec<u64>, Vec<f32>)> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let npy = npyz::NpyFile::new(&bytes[..])
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let shape = npy.shape().to_vec();
    let data = match npy.into_vec::<f32>() {
        Ok(data) => data,
        Err(_) => {
            let npy = npyz::NpyFile::new(&bytes[..])
                .with_context(|| format!("failed to parse {}", path.display()))?;
            npy.into_vec::<f64>()
                .with_context(|| format!("{} holds non-float data", path.display()))?
                .into_iter()
                .map(|value| value as f32)
                .collect()
        }
    };
    Ok((shape, data))
}

/// Synthetic tables covering every walkable maze cell: embeddings are the
/// scaled cell coordinates, distributions are uniform over the actions whose
/// destination cell is walkable (stay always included).
#[cfg(test)]
pub(crate) fn synthetic_tables() -> NavTables {
    use crate::game::{maze::MAZE, walkable_cells};
    use std::collections::HashSet;

    let coords = walkable_cells(&MAZE);
    let coord_set: HashSet<Pos> = coords.iter().copied().collect();
    let embeddings = coords
        .iter()
        .map(|&(x, y)| vec![x as f32 / 28.0, y as f32 / 31.0])
        .collect();
    let n = coords.len();
    let mut distributions = vec![vec![[0.0f32; NUM_ACTIONS]; n]; n];
    for (i, &(x, y)) in coords.iter().enumerate() {
        let mut row = [0.0f32; NUM_ACTIONS];
        row[0] = 1.0;
        if coord_set.contains(&(x, y + 1)) {
            row[1] = 1.0;
        }
        if y > 0 && coord_set.contains(&(x, y - 1)) {
            row[2] = 1.0;
        }
        if x > 0 && coord_set.contains(&(x - 1, y)) {
            row[3] = 1.0;
        }
        if coord_set.contains(&(x + 1, y)) {
            row[4] = 1.0;
        }
        let mass = 1.0 / row.iter().sum::<f32>();
        for value in row.iter_mut() {
            *value *= mass;
        }
        for target in 0..n {
            distributions[i][target] = row;
        }
    }
    NavTables::from_parts(coords, embeddings, distributions).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use npyz::WriterBuilder;

    fn write_npy(path: &Path, shape: &[u64], data: &[f32]) {
        let mut buf = Vec::new();
        let mut writer = npyz::WriteOptions::new()
            .default_dtype()
            .shape(shape)
            .writer(&mut buf)
            .begin_nd()
            .unwrap();
        writer.extend(data.iter().copied()).unwrap();
        writer.finish().unwrap();
        fs::write(path, &buf).unwrap();
    }

    fn tiny_tables() -> (Vec<Pos>, Vec<Vec<f32>>, Vec<Vec<[f32; NUM_ACTIONS]>>) {
        let coords = vec![(1, 1), (1, 2), (2, 1)];
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]];
        let mut distributions = vec![vec![[0.0; NUM_ACTIONS]; 3]; 3];
        // From node 0: stay or up toward node 1, stay or right toward node 2.
        distributions[0][1] = [0.5, 0.5, 0.0, 0.0, 0.0];
        distributions[0][2] = [0.5, 0.0, 0.0, 0.0, 0.5];
        distributions[1][0] = [0.5, 0.0, 0.5, 0.0, 0.0];
        distributions[2][0] = [0.5, 0.0, 0.0, 0.5, 0.0];
        (coords, embeddings, distributions)
    }

    #[test]
    fn test_from_parts_derives_valid_actions() {
        let (coords, embeddings, distributions) = tiny_tables();
        let tables = NavTables::from_parts(coords, embeddings, distributions).unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables.embed_dim(), 2);
        // Node 0 can stay, go up, or go right; never down or left.
        assert_eq!(tables.valid_actions(0), [1.0, 1.0, 0.0, 0.0, 1.0]);
        // Node 1 can stay or go down.
        assert_eq!(tables.valid_actions(1), [1.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_node_lookup() {
        let (coords, embeddings, distributions) = tiny_tables();
        let tables = NavTables::from_parts(coords, embeddings, distributions).unwrap();
        assert_eq!(tables.node_index((1, 2)), Some(1));
        assert_eq!(tables.node_index((9, 9)), None);
        assert_eq!(tables.embedding(2), &[0.5, 0.5]);
        assert_eq!(tables.distribution(0, 1), [0.5, 0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_parts_rejects_mismatched_shapes() {
        let (coords, embeddings, _) = tiny_tables();
        let bad = vec![vec![[0.0; NUM_ACTIONS]; 2]; 3];
        assert!(NavTables::from_parts(coords, embeddings, bad).is_err());
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (coords, embeddings, distributions) = tiny_tables();

        let coords_json: Vec<[usize; 2]> = coords.iter().map(|&(x, y)| [x, y]).collect();
        fs::write(
            dir.path().join("node_coords.json"),
            serde_json::to_string(&coords_json).unwrap(),
        )
        .unwrap();

        let embed_flat: Vec<f32> = embeddings.iter().flatten().copied().collect();
        write_npy(&dir.path().join("node_embeddings.npy"), &[3, 2], &embed_flat);

        let dist_flat: Vec<f32> = distributions
            .iter()
            .flatten()
            .flat_map(|row| row.iter().copied())
            .collect();
        write_npy(
            &dir.path().join("action_distributions.npy"),
            &[3, 3, NUM_ACTIONS as u64],
            &dist_flat,
        );

        let tables = NavTables::load(dir.path()).unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables.embed_dim(), 2);
        assert_eq!(tables.node_index((2, 1)), Some(2));
        assert_eq!(tables.distribution(1, 0), [0.5, 0.0, 0.5, 0.0, 0.0]);
        assert_eq!(tables.valid_actions(0), [1.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_load_fails_without_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(NavTables::load(dir.path()).is_err());
    }

    #[test]
    fn test_synthetic_tables_cover_the_maze() {
        let tables = synthetic_tables();
        let start = crate::game::variables::PACMAN_STARTING_POS;
        let node = tables.node_index(start).unwrap();
        // Stay is always valid; at least one direction must be too.
        let valid = tables.valid_actions(node);
        assert_eq!(valid[0], 1.0);
        assert!(valid[1..].iter().any(|&v| v == 1.0));
    }
}
