pub mod do_task;
