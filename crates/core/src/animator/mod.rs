pub mod ring_animator;
