//! Skeleton block decoding
//!
//! The block starts with four `i32` offsets relative to its own base:
//! parent table, hierarchy order, child objects and rest transforms. The
//! three tables hold one byte per bone: signed for parents and child
//! objects (`-1` for none), unsigned for the order. Each transform record is
//! a rest position followed by 0x14 bytes this decoder does not model.

use glam::Vec3;

use crate::error::{Error, Result};
use crate::formats::common::BinaryReader;

/// Bytes after each rest position in a transform record.
const TRANSFORM_TAIL: i64 = 0x14;

/// A bone in the rest pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub index: usize,
    /// Rest position relative to the parent bone.
    pub position: Vec3,
    /// Parent bone index, `None` for roots.
    pub parent: Option<usize>,
}

/// Bone forest with the raw tables it was built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
    /// Parent index per decode slot, `-1` for roots.
    pub hierarchy: Vec<i8>,
    /// Bone index per decode slot.
    pub hierarchy_order: Vec<u8>,
    /// Object attached to each bone, `-1` for none.
    pub child_objects: Vec<i8>,
}

impl Skeleton {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bones without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Bone> {
        self.bones.iter().filter(|bone| bone.parent.is_none())
    }

    /// Direct children of `bone`.
    pub fn children(&self, bone: usize) -> impl Iterator<Item = &Bone> {
        self.bones.iter().filter(move |b| b.parent == Some(bone))
    }

    /// `(bone, object)` pairs from the child object table.
    #[must_use]
    pub fn attachments(&self) -> Vec<(usize, usize)> {
        self.child_objects
            .iter()
            .enumerate()
            .filter_map(|(bone, &object)| usize::try_from(object).ok().map(|o| (bone, o)))
            .collect()
    }

    /// Bone indices ordered so every parent precedes its children.
    #[must_use]
    pub fn dependency_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = self.roots().map(|b| b.index).collect();
        let mut next = 0;
        while next < order.len() {
            let parent = order[next];
            order.extend(self.children(parent).map(|b| b.index));
            next += 1;
        }
        order
    }

    /// Model-space head of every bone: each rest position plus the heads of
    /// all its ancestors.
    #[must_use]
    pub fn world_positions(&self) -> Vec<Vec3> {
        let mut world = vec![Vec3::ZERO; self.bones.len()];
        for index in self.dependency_order() {
            let bone = &self.bones[index];
            let base = bone.parent.map_or(Vec3::ZERO, |p| world[p]);
            world[index] = base + bone.position;
        }
        world
    }
}

/// Decode the skeleton block at `offset` holding `bone_count` bones.
///
/// A model without bones has no skeleton block and decodes to an empty
/// skeleton without touching the stream.
///
/// # Errors
/// Returns [`Error::TruncatedInput`] if a table runs past the end of the
/// file and [`Error::MalformedHierarchy`] if the tables do not describe a
/// bone forest.
pub fn read_skeleton(data: &[u8], offset: i64, bone_count: usize) -> Result<Skeleton> {
    if bone_count == 0 {
        return Ok(Skeleton::default());
    }

    let mut reader = BinaryReader::at(data, offset)?;
    let hierarchy_offset = reader.read_i32()?;
    let order_offset = reader.read_i32()?;
    let child_offset = reader.read_i32()?;
    let transforms_offset = reader.read_i32()?;

    let mut read_table = |relative: i32| -> Result<Vec<u8>> {
        reader.seek_offset(offset + i64::from(relative))?;
        (0..bone_count).map(|_| reader.read_u8()).collect()
    };
    let signed = |table: Vec<u8>| table.into_iter().map(|b| b as i8).collect::<Vec<_>>();
    let hierarchy = signed(read_table(hierarchy_offset)?);
    let hierarchy_order = read_table(order_offset)?;
    let child_objects = signed(read_table(child_offset)?);

    reader.seek_offset(offset + i64::from(transforms_offset))?;
    let mut bones = Vec::with_capacity(bone_count);
    for index in 0..bone_count {
        let position = Vec3::from_array(reader.read_vec3()?);
        reader.skip(TRANSFORM_TAIL)?;
        bones.push(Bone {
            index,
            position,
            parent: None,
        });
    }

    let order = validate_order(&hierarchy_order)?;
    for (slot, (&bone, &parent)) in order.iter().zip(&hierarchy).enumerate() {
        bones[bone].parent = match parent {
            -1 => None,
            p if p >= 0 && (p as usize) < bone_count => Some(p as usize),
            p => {
                return Err(Error::MalformedHierarchy {
                    bone,
                    reason: format!("slot {slot} names parent {p} of {bone_count} bones"),
                });
            }
        };
    }
    check_acyclic(&bones)?;

    tracing::debug!(bones = bone_count, "decoded skeleton");
    Ok(Skeleton {
        bones,
        hierarchy,
        hierarchy_order,
        child_objects,
    })
}

/// Check that the order table is a permutation and return it as indices.
fn validate_order(order: &[u8]) -> Result<Vec<usize>> {
    let count = order.len();
    let mut seen = vec![false; count];
    order
        .iter()
        .enumerate()
        .map(|(slot, &value)| {
            let index = usize::from(value);
            if index >= count {
                return Err(Error::MalformedHierarchy {
                    bone: slot,
                    reason: format!("hierarchy order {value} outside 0..{count}"),
                });
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(Error::MalformedHierarchy {
                    bone: index,
                    reason: format!("hierarchy order repeats bone {index} at slot {slot}"),
                });
            }
            Ok(index)
        })
        .collect()
}

/// Reject parent chains that loop back on themselves.
fn check_acyclic(bones: &[Bone]) -> Result<()> {
    for start in bones {
        let mut current = start.parent;
        let mut steps = 0;
        while let Some(parent) = current {
            steps += 1;
            if parent == start.index || steps > bones.len() {
                return Err(Error::MalformedHierarchy {
                    bone: start.index,
                    reason: "parent chain forms a cycle".to_string(),
                });
            }
            current = bones[parent].parent;
        }
    }
    Ok(())
}
