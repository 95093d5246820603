use std::sync::Arc;

use fliper_core::{Color, FrameBuffer};
use serde::Serialize;

use crate::backend::{ImageBackend, ImageHandle, Layer};
use crate::transition::ObjectState;

/// The drawing surface. Fixed once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

/// A placed image, addressed by its id.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: String,
    pub image: ImageHandle,
    pub position: (i64, i64),
}

/// Point-in-time view of one object, recorded alongside every frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSnapshot {
    pub id: String,
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    pub alpha: u8,
}

/// Live objects in declaration order. Later objects paint on top.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Append a new object on top. Returns false (and changes nothing) if
    /// the id is taken.
    pub fn insert(&mut self, id: impl Into<String>, image: FrameBuffer, position: (i64, i64)) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.objects.push(SceneObject {
            id,
            image: Arc::new(image),
            position,
        });
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<SceneObject> {
        self.index_of(id).map(|i| self.objects.remove(i))
    }

    /// The transition-facing view of an object.
    pub fn state(&self, id: &str) -> Option<ObjectState> {
        self.get(id).map(|o| ObjectState {
            image: Arc::clone(&o.image),
            position: o.position,
        })
    }

    /// Write a transition result back. Returns false if the id is gone.
    pub fn update(&mut self, id: &str, state: ObjectState) -> bool {
        match self.index_of(id) {
            Some(i) => {
                let object = &mut self.objects[i];
                object.image = state.image;
                object.position = state.position;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn layers(&self) -> Vec<Layer<'_>> {
        self.objects
            .iter()
            .map(|o| Layer {
                image: &o.image,
                x: o.position.0,
                y: o.position.1,
            })
            .collect()
    }

    /// Composite every live object onto a fresh canvas.
    pub fn render<B: ImageBackend + ?Sized>(&self, canvas: &Canvas, backend: &B) -> FrameBuffer {
        backend.composite(canvas.background, canvas.width, canvas.height, &self.layers())
    }

    pub fn snapshot(&self) -> Vec<ObjectSnapshot> {
        self.objects
            .iter()
            .map(|o| ObjectSnapshot {
                id: o.id.clone(),
                x: o.position.0,
                y: o.position.1,
                width: o.image.width,
                height: o.image.height,
                alpha: o.image.uniform_alpha(),
            })
            .collect()
    }
}
