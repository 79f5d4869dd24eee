mod model_loaders;

pub use model_loaders::{ModelLoaderDeps, load_do_task_middleware};
