pub mod quaternion;
