pub use self::{
    steer::{steer_towards, Steering},
    throttle::{throttle, Throttle},
};

mod steer;
mod throttle;
